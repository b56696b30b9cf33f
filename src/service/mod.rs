pub mod module_service;

pub use module_service::{CreateModuleRequest, ModuleService, ServiceError, ServiceResult};
