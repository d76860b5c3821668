pub mod idp;
pub mod sp;

pub use idp::{IdpDescriptor, IdpQuirks, MetadataTransport, TlsOptions};
pub use sp::SpDescriptor;
