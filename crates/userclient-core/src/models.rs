//! Records returned by the user service.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Role names shared with the user service.
pub mod roles {
    pub const ADMIN: &str = "Admin";
    pub const ACCESS_ADMIN: &str = "AccessAdmin";
    pub const SHIPPING_PROVIDER: &str = "ShippingProvider";
    pub const LOCATION_TREE: &str = "LocationTree";
    pub const RETURN: &str = "Return";

    pub const PLATFORM_TRANSPORTATION: &str = "PlatformTransportation";
    pub const PLATFORM_WAREHOUSE: &str = "PlatformWarehouse";
    pub const PLATFORM_OVERVIEW: &str = "PlatformOverview";

    /// Roles whose holders are limited to the platforms listed on their record.
    pub const PLATFORM_ROLES: [&str; 3] = [
        PLATFORM_TRANSPORTATION,
        PLATFORM_WAREHOUSE,
        PLATFORM_OVERVIEW,
    ];

    /// Returns-management roles.
    pub mod rms {
        pub const ADMIN: &str = "RmsAdmin";
        pub const RETURN_OPERATOR: &str = "RmsReturnOperator";
        pub const CB_OPERATOR: &str = "RmsCbOperator";
        pub const API: &str = "RmsApi";
        pub const APPLICATION_ADMIN: &str = "RmsApplicationAdmin";
        pub const CS: &str = "RmsCs";

        /// Per-country administrators.
        pub const ADMIN_ID: &str = "ID_RMS_ADMIN";
        pub const ADMIN_VN: &str = "VN_RMS_ADMIN";
        pub const ADMIN_TH: &str = "TH_RMS_ADMIN";
        pub const ADMIN_SG: &str = "SG_RMS_ADMIN";
        pub const ADMIN_PH: &str = "PH_RMS_ADMIN";
        pub const ADMIN_MY: &str = "MY_RMS_ADMIN";
        pub const ADMIN_PK: &str = "PK_RMS_ADMIN";
        pub const ADMIN_BD: &str = "BD_RMS_ADMIN";
        pub const ADMIN_LK: &str = "LK_RMS_ADMIN";
        pub const ADMIN_NP: &str = "NP_RMS_ADMIN";
        pub const ADMIN_MM: &str = "MM_RMS_ADMIN";

        /// Per-country return operators.
        pub const RETURN_OPERATOR_ID: &str = "ID_RMS_RETURN-OPERATOR";
        pub const RETURN_OPERATOR_VN: &str = "VN_RMS_RETURN-OPERATOR";
        pub const RETURN_OPERATOR_TH: &str = "TH_RMS_RETURN-OPERATOR";
        pub const RETURN_OPERATOR_SG: &str = "SG_RMS_RETURN-OPERATOR";
        pub const RETURN_OPERATOR_PH: &str = "PH_RMS_RETURN-OPERATOR";
        pub const RETURN_OPERATOR_MY: &str = "MY_RMS_RETURN-OPERATOR";
        pub const RETURN_OPERATOR_PK: &str = "PK_RMS_RETURN-OPERATOR";
        pub const RETURN_OPERATOR_BD: &str = "BD_RMS_RETURN-OPERATOR";
        pub const RETURN_OPERATOR_LK: &str = "LK_RMS_RETURN-OPERATOR";
        pub const RETURN_OPERATOR_NP: &str = "NP_RMS_RETURN-OPERATOR";
        pub const RETURN_OPERATOR_MM: &str = "MM_RMS_RETURN-OPERATOR";

        /// Per-country customer service.
        pub const CS_ID: &str = "ID_RMS_CS";
        pub const CS_VN: &str = "VN_RMS_CS";
        pub const CS_TH: &str = "TH_RMS_CS";
        pub const CS_SG: &str = "SG_RMS_CS";
        pub const CS_PH: &str = "PH_RMS_CS";
        pub const CS_MY: &str = "MY_RMS_CS";
        pub const CS_PK: &str = "PK_RMS_CS";
        pub const CS_BD: &str = "BD_RMS_CS";
        pub const CS_LK: &str = "LK_RMS_CS";
        pub const CS_NP: &str = "NP_RMS_CS";
        pub const CS_MM: &str = "MM_RMS_CS";

        /// Per-country cross-border operators.
        pub const CROSSBORDER_OPERATOR_ID: &str = "ID_RMS_CROSSBORDER-OPERATOR";
        pub const CROSSBORDER_OPERATOR_VN: &str = "VN_RMS_CROSSBORDER-OPERATOR";
        pub const CROSSBORDER_OPERATOR_TH: &str = "TH_RMS_CROSSBORDER-OPERATOR";
        pub const CROSSBORDER_OPERATOR_SG: &str = "SG_RMS_CROSSBORDER-OPERATOR";
        pub const CROSSBORDER_OPERATOR_PH: &str = "PH_RMS_CROSSBORDER-OPERATOR";
        pub const CROSSBORDER_OPERATOR_MY: &str = "MY_RMS_CROSSBORDER-OPERATOR";
        pub const CROSSBORDER_OPERATOR_PK: &str = "PK_RMS_CROSSBORDER-OPERATOR";
        pub const CROSSBORDER_OPERATOR_BD: &str = "BD_RMS_CROSSBORDER-OPERATOR";
        pub const CROSSBORDER_OPERATOR_LK: &str = "LK_RMS_CROSSBORDER-OPERATOR";
        pub const CROSSBORDER_OPERATOR_NP: &str = "NP_RMS_CROSSBORDER-OPERATOR";
        pub const CROSSBORDER_OPERATOR_MM: &str = "MM_RMS_CROSSBORDER-OPERATOR";
    }
}

/// An authenticated identity as returned by the user service.
///
/// A fresh value is produced for every fetch or cache hit; callers own it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub active: bool,
    /// Ordered; duplicates are kept as delivered.
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, rename = "platforms")]
    pub platform_names: Vec<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl User {
    /// Returns `true` if the user holds any of `roles`.
    #[must_use]
    pub fn has_role(&self, roles: &[&str]) -> bool {
        roles
            .iter()
            .any(|wanted| self.roles.iter().any(|role| role == wanted))
    }

    /// Returns `true` if the user is restricted to a set of platforms.
    #[must_use]
    pub fn has_platform_role(&self) -> bool {
        self.has_role(&roles::PLATFORM_ROLES)
    }

    /// Returns `true` if the user may act on the platform `name`.
    ///
    /// Users without a platform role are not restricted.
    #[must_use]
    pub fn has_access_to_platform(&self, name: &str) -> bool {
        if !self.has_platform_role() {
            return true;
        }
        self.platform_names.iter().any(|platform| platform == name)
    }
}

/// A platform entry from the `/users/{id}/platforms` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
}

/// A token the service has revoked before its natural expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedToken {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expired_at: OffsetDateTime,
}

impl RevokedToken {
    /// Time left until the token would have expired.
    ///
    /// Negative once the expiry has passed.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.expired_at - OffsetDateTime::now_utc()
    }
}
