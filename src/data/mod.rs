pub mod index_store;
