// Google credential infra.
// - `json_credential_store.rs` / `in_memory_store.rs` persist the credential.
// - `token_refresher.rs` runs the refresh-token grant.
// - `google_flow.rs` picks the interactive flow from the registration file:
//   `installed_app_flow.rs` (browser consent) or `service_account.rs` (JWT).

pub mod client_registration;
pub mod google_flow;
pub mod in_memory_store;
pub mod installed_app_flow;
pub mod json_credential_store;
pub mod service_account;
pub mod token_endpoint;
pub mod token_refresher;

pub use google_flow::GoogleAuthorizationFlow;
pub use in_memory_store::InMemoryCredentialStore;
pub use json_credential_store::JsonCredentialStore;
pub use token_refresher::GoogleTokenRefresher;
