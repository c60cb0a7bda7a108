pub mod catalog_service;
pub mod rename_service;
pub mod thumbnail_service;
