//! SurrealDB repository implementations.

mod account;
mod permission;
mod resource;
mod role;

pub use account::SurrealAccountRepository;
pub use permission::SurrealPermissionRepository;
pub use resource::SurrealResourceRepository;
pub use role::SurrealRoleRepository;
