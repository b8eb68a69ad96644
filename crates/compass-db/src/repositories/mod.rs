// All repository functions are generic over `E: Executor<'e, Database = Postgres>`
// so they accept both a `&PgPool` (direct query) and a `&mut Transaction` (atomic operations).

pub mod admin;
pub mod assignment;
pub mod auth;
pub mod horoscope;
pub mod mentor;
pub mod payment;
pub mod student;
pub mod user;
