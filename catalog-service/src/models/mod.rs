pub mod pointer;

pub use pointer::AssetPointer;
