// Command dispatch and terminal output
pub mod commands;
pub mod render;

use anyhow::Result;

use crate::{BookingCommand, Cli, Command, booking::AppointmentStatus};

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze {
            symbol,
            interval,
            days,
            json,
        } => commands::analyze(&symbol, interval, days, json).await,
        Command::Scan {
            interval,
            days,
            symbols,
            pairs_file,
            all_usdt,
            json,
        } => commands::scan(interval, days, symbols, pairs_file, all_usdt, json).await,
        Command::Crossover {
            symbol,
            interval,
            days,
            amount,
            entry,
            json,
        } => commands::crossover(&symbol, interval, days, amount, entry, json).await,
        Command::Export {
            symbol,
            interval,
            days,
            out,
            format,
        } => commands::export(&symbol, interval, days, &out, format).await,
        Command::Stream { symbol, interval } => commands::stream(&symbol, interval).await,
        Command::Bookings { action } => {
            let store = commands::open_bookings(&cli.db).await?;
            match action {
                BookingCommand::Add {
                    name,
                    phone,
                    date,
                    time,
                    service,
                } => commands::add_booking(&store, &name, &phone, &date, &time, &service).await,
                BookingCommand::List { json } => commands::list_bookings(&store, json).await,
                BookingCommand::Confirm { id } => {
                    commands::set_booking_status(&store, id, AppointmentStatus::Confirmed).await
                }
                BookingCommand::Cancel { id } => {
                    commands::set_booking_status(&store, id, AppointmentStatus::Cancelled).await
                }
                BookingCommand::Delete { id } => commands::delete_booking(&store, id).await,
            }
        }
    }
}
