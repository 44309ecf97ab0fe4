mod storage;

pub use storage::FileStore;
