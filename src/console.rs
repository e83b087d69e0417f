//! Interactive console front end
//!
//! A line-oriented menu over stdin driving the same lifecycle service as the
//! HTTP API.

use parking_lot::Mutex;
use parkit_core::{
    traits::{InputReader, SpotRepository, TicketRepository},
    AppError, AppResult,
};
use parkit_services::{EntryOutcome, ParkingService};
use rust_decimal::Decimal;
use std::io::{self, BufRead, BufReader, Stdin};
use tracing::{error, info};

/// Reads answers line by line from a buffered source
pub struct ConsoleInputReader<R> {
    input: Mutex<R>,
}

impl ConsoleInputReader<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead + Send> ConsoleInputReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }

    /// Next trimmed line, `None` once the input is exhausted
    fn read_line(&self) -> AppResult<Option<String>> {
        let mut line = String::new();
        if self.input.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn parse_int(line: &str) -> AppResult<i32> {
        line.parse().map_err(|e| {
            error!("Error while reading user input from shell: {}", e);
            AppError::InvalidInput(format!("'{}' is not a number", line))
        })
    }

    /// Menu choice, `None` once the input is exhausted
    pub fn read_menu_option(&self) -> AppResult<Option<i32>> {
        self.read_line()?.map(|line| Self::parse_int(&line)).transpose()
    }
}

fn input_closed() -> AppError {
    AppError::InvalidInput("input closed".to_string())
}

impl<R: BufRead + Send> InputReader for ConsoleInputReader<R> {
    fn read_selection(&self) -> AppResult<i32> {
        println!("Please select vehicle type from menu");
        println!("1 CAR");
        println!("2 BIKE");

        let line = self.read_line()?.ok_or_else(input_closed)?;
        Self::parse_int(&line)
    }

    fn read_vehicle_registration(&self) -> AppResult<String> {
        println!("Please type the vehicle registration number and press enter key");

        let line = self.read_line()?.ok_or_else(input_closed)?;
        if line.is_empty() {
            error!("Empty vehicle registration entered");
            return Err(AppError::InvalidInput(
                "Invalid input provided".to_string(),
            ));
        }
        Ok(line)
    }
}

fn print_menu() {
    println!("Please select an option. Simply enter the number to choose an action");
    println!("1 New Vehicle Entering - Allocate Parking Space");
    println!("2 Vehicle Exiting - Generate Ticket Price");
    println!("3 Shutdown System");
}

/// Run the menu loop until shutdown is chosen or the input ends
pub async fn run_shell<S, T, R>(
    service: &ParkingService<S, T>,
    input: &ConsoleInputReader<R>,
) -> AppResult<()>
where
    S: SpotRepository,
    T: TicketRepository,
    R: BufRead + Send,
{
    let discount_percent =
        (Decimal::ONE - service.fare_calculator().schedule().discount_factor()) * Decimal::ONE_HUNDRED;

    println!("Welcome to Parking System!");

    loop {
        print_menu();

        let option = match input.read_menu_option() {
            Ok(Some(option)) => option,
            Ok(None) => {
                info!("Input closed, shutting down");
                break;
            }
            Err(_) => {
                println!("Unsupported option. Please enter a number corresponding to the provided menu");
                continue;
            }
        };

        match option {
            1 => {
                let outcome = service.process_incoming_vehicle(input).await;
                if let EntryOutcome::Parked(receipt) = &outcome {
                    if receipt.recurring {
                        println!(
                            "Welcome back! As a recurring user of our parking lot, you'll benefit from a {}% discount.",
                            discount_percent.normalize()
                        );
                    }
                }
                println!("{}", outcome);
            }
            2 => match service.process_exiting_vehicle(input).await {
                Ok(outcome) => println!("{}", outcome),
                Err(e) => {
                    error!("Unable to process exiting vehicle: {}", e);
                    println!("Unable to process exiting vehicle: {}", e);
                }
            },
            3 => {
                println!("Exiting from the system!");
                break;
            }
            _ => println!("Unsupported option. Please enter a number corresponding to the provided menu"),
        }
    }

    Ok(())
}
