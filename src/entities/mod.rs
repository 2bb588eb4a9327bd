//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod attendance;
pub mod competition;
pub mod competition_registration;
pub mod convocation;
pub mod convocation_athlete;
pub mod convocation_group;
pub mod event;
pub mod event_type;
pub mod financial_entry;
pub mod invoice;
pub mod invoice_item;
pub mod movement;
pub mod movement_item;
pub mod product;
pub mod race;
pub mod race_result;
pub mod result;
pub mod sale;
pub mod user;

// Re-export specific types to avoid conflicts
pub use attendance::Entity as Attendance;
pub use competition::Entity as Competition;
pub use competition_registration::Entity as CompetitionRegistration;
pub use convocation::Entity as Convocation;
pub use convocation_athlete::Entity as ConvocationAthlete;
pub use convocation_group::Entity as ConvocationGroup;
pub use event::Entity as Event;
pub use event_type::Entity as EventType;
pub use financial_entry::{Entity as FinancialEntry, EntryKind};
pub use invoice::{Entity as Invoice, PaymentStatus};
pub use invoice_item::Entity as InvoiceItem;
pub use movement::Entity as Movement;
pub use movement_item::Entity as MovementItem;
pub use product::Entity as Product;
pub use race::Entity as Race;
pub use race_result::Entity as RaceResult;
pub use result::Entity as CompetitionResult;
pub use sale::Entity as Sale;
pub use user::Entity as User;
