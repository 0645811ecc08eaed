//! 키 스키마와 저장소 값 스키마. 각각 한 곳에서만 정의된다.

pub mod descriptors;
pub mod keys;

pub use descriptors::{
    BackendDescriptor, Descriptor, FrontendDescriptor, ListenerAddress, ListenerDescriptor,
    MiddlewareDescriptor, MiddlewareConfig, ServerDescriptor,
};
pub use keys::{frontend_id, is_valid_segment, KeySchema};
