//! folio - 极简编辑器状态核心
//!
//! 模块结构：
//! - kernel: 状态与归约（Store, Action, Effect）、文档注册表、目录树投影、会话
//! - kernel::services: 端口与适配器（文件代理、目录监视、git、会话存储、运行时）
//! - models: 数据模型（FileTree, IgnoreRules）
//! - app: 应用层（Application, Workbench）

pub mod app;
pub mod kernel;
pub mod models;
