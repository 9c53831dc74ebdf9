pub mod ids;
pub mod registry;

pub use ids::{CategoryId, PhysicianId, TaskId};
pub use registry::{
    DaysParameter, Physician, Registry, RegistryBuilder, Task, TaskCategory, TaskType,
    UnavailabilityInterval,
};
