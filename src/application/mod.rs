pub mod import_service;
pub mod uploader;
pub mod validator;
