//! 运行时：生命周期与运行模式
pub mod lifetime;
pub mod modes;
