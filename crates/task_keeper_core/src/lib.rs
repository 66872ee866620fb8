pub mod domain;
pub mod listing;
pub mod memory;
pub mod ports;
pub mod seed;
pub mod store;

pub use domain::{
    DraftField, DraftRejected, StoreSnapshot, Task, TaskDraft, TaskStatus, UserProfile,
    UserRecord,
};
pub use listing::{order_for_listing, status_priority, TaskFilter};
pub use memory::InMemoryStorage;
pub use ports::{
    AuthorizationOutcome, AuthorizationPrompt, AuthorizationRequest, CodeExchange,
    KeyValueStorage, NoSeeding, PortError, PortResult, TaskSeeder, TokenEndpoint, TokenResponse,
};
pub use seed::SampleTaskSeeder;
pub use store::{StoreError, StoreResult, UserStore, USERS_KEY, USER_AUTHORIZED_KEY};
