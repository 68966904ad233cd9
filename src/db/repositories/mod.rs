// Database repository management

mod allocation_repository;
mod investor_repository;
mod subscription_repository;

pub use allocation_repository::AllocationRepository;
pub use investor_repository::InvestorRepository;
pub use subscription_repository::{SubscriptionFlag, SubscriptionRepository};

use sea_orm::DatabaseConnection;

/// Container for all database repositories
#[derive(Clone, Debug)]
pub struct Repositories {
    pub investor: InvestorRepository,
    pub subscription: SubscriptionRepository,
    pub allocation: AllocationRepository,
}

impl Repositories {
    /// Creates a new repositories container with database connection
    pub fn new(conn: DatabaseConnection) -> Self {
        Repositories {
            investor: InvestorRepository::new(conn.clone()),
            subscription: SubscriptionRepository::new(conn.clone()),
            allocation: AllocationRepository::new(conn),
        }
    }
}
