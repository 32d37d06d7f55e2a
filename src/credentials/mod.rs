pub mod service_account;
pub mod signer;
