//! Pure attendance/leave accounting. Nothing here touches the database;
//! handlers load the rows and settings, call in, then write the results.

pub mod clock;
pub mod late;
pub mod leave_days;
