//! 进程生命周期：启动准备与优雅关闭
pub mod shutdown;
pub mod startup;
