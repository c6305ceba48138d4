//! Capability Table
//!
//! 所有按角色授权的操作集中在一张表里，路由层通过
//! [`require_capability`](super::require_capability) 在进入处理函数之前检查。
//!
//! 订单归属 (waitress 只能操作自己的订单) 不在这里检查，由订单引擎负责。

use std::fmt;

use shared::models::Role;

/// Operation gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    // === 所有角色 ===
    ViewMenu,
    ViewSettings,
    ViewCategories,
    ViewAddOns,
    DeductStock,

    // === 店主 ===
    ManageMenu,
    ManageCategories,
    ManageAddOns,
    AdjustStock,
    ManageStaff,
    ManageSettings,
    ViewReports,
    ReviewCancellations,
    ViewAllOrders,
    ViewDailyPayments,
    UploadImages,

    // === 店主 + 出品站 ===
    ToggleAvailability,

    // === 服务员 ===
    CreateOrder,
    EditOrder,
    CancelOrder,
    ProcessPayment,
    ViewOwnOrders,

    // === 出品站 ===
    ViewStationOrders,
    UpdateOrderStatus,

    // === 服务员 + 店主 ===
    ViewOrder,
}

const ALL_ROLES: &[Role] = &[Role::Owner, Role::Waitress, Role::Kitchen, Role::Juicebar];
const OWNER: &[Role] = &[Role::Owner];
const WAITRESS: &[Role] = &[Role::Waitress];
const STATIONS: &[Role] = &[Role::Kitchen, Role::Juicebar];
const OWNER_AND_STATIONS: &[Role] = &[Role::Owner, Role::Kitchen, Role::Juicebar];
const WAITRESS_AND_OWNER: &[Role] = &[Role::Waitress, Role::Owner];

impl Capability {
    /// Roles allowed to perform this operation
    pub const fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Self::ViewMenu
            | Self::ViewSettings
            | Self::ViewCategories
            | Self::ViewAddOns
            | Self::DeductStock => ALL_ROLES,

            Self::ManageMenu
            | Self::ManageCategories
            | Self::ManageAddOns
            | Self::AdjustStock
            | Self::ManageStaff
            | Self::ManageSettings
            | Self::ViewReports
            | Self::ReviewCancellations
            | Self::ViewAllOrders
            | Self::ViewDailyPayments
            | Self::UploadImages => OWNER,

            Self::ToggleAvailability => OWNER_AND_STATIONS,

            Self::CreateOrder
            | Self::EditOrder
            | Self::CancelOrder
            | Self::ProcessPayment
            | Self::ViewOwnOrders => WAITRESS,

            Self::ViewStationOrders | Self::UpdateOrderStatus => STATIONS,

            Self::ViewOrder => WAITRESS_AND_OWNER,
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
