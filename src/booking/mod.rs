// Appointment bookings for the shop front desk
mod model;
mod store;

pub use {
    model::{Appointment, AppointmentStatus, DATE_FORMAT, NewAppointment, TIME_FORMAT},
    store::{AppointmentStore, SqliteAppointmentStore},
};
