//! # Menu
//!
//! The interactive loop. Reads a choice, routes it to a handler, reports
//! any failure and keeps going until the shopper exits or input ends.
//!
//! ```text
//! --- Main Menu ---
//! 1. View Products
//! 2. Add Product to Cart
//! 3. View Cart
//! 4. Checkout
//! 5. Exit
//! ```

use crate::handlers::{self, CommandError, InputError};
use crate::state::ShopState;
use chrono::{DateTime, Utc};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// A main-menu selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ViewProducts,
    AddToCart,
    ViewCart,
    Checkout,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::ViewProducts),
            "2" => Some(MenuChoice::AddToCart),
            "3" => Some(MenuChoice::ViewCart),
            "4" => Some(MenuChoice::Checkout),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Parse a product number as shown in the listing (1-based)
pub fn parse_product_number(input: &str, catalog_len: usize) -> Result<usize, InputError> {
    let trimmed = input.trim();
    let number: usize = trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))?;
    if number == 0 || number > catalog_len {
        return Err(InputError::NoSuchProduct(number));
    }
    Ok(number)
}

/// Parse a quantity. Zero is accepted here; the cart rejects it.
pub fn parse_quantity(input: &str) -> Result<u32, InputError> {
    let trimmed = input.trim();
    trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))
}

/// Print `message` and read one line. `None` means input ended.
pub fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> io::Result<Option<String>> {
    write!(out, "{}", message)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn print_menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n--- Main Menu ---")?;
    writeln!(out, "1. View Products")?;
    writeln!(out, "2. Add Product to Cart")?;
    writeln!(out, "3. View Cart")?;
    writeln!(out, "4. Checkout")?;
    writeln!(out, "5. Exit")
}

/// Run the menu loop until the shopper exits or input ends.
///
/// `clock` is asked for the current time whenever expiry matters.
pub fn run<R, W, C>(state: &mut ShopState, mut input: R, mut out: W, clock: C) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    C: Fn() -> DateTime<Utc>,
{
    loop {
        print_menu(&mut out)?;
        let Some(line) = prompt(&mut input, &mut out, "Choose an option: ")? else {
            break;
        };

        let result = match MenuChoice::parse(&line) {
            Some(MenuChoice::ViewProducts) => {
                handlers::list_products(state, &mut out, clock()).map_err(CommandError::from)
            }
            Some(MenuChoice::AddToCart) => match add_flow(state, &mut input, &mut out, &clock)? {
                Some(result) => result,
                None => break,
            },
            Some(MenuChoice::ViewCart) => handlers::view_cart(state, &mut out),
            Some(MenuChoice::Checkout) => handlers::checkout(state, &mut out, clock()).map(|_| ()),
            Some(MenuChoice::Exit) => break,
            None => {
                writeln!(out, "Invalid choice. Please try again.")?;
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(CommandError::Io(e)) => return Err(e),
            Err(e) => {
                debug!(error = %e, "command failed");
                writeln!(out, "Error: {}", e)?;
            }
        }
    }

    writeln!(out, "Goodbye!")?;
    out.flush()
}

/// Prompt for product number and quantity. `Ok(None)` means input ended.
fn add_flow<R, W, C>(
    state: &mut ShopState,
    input: &mut R,
    out: &mut W,
    clock: &C,
) -> io::Result<Option<Result<(), CommandError>>>
where
    R: BufRead,
    W: Write,
    C: Fn() -> DateTime<Utc>,
{
    handlers::list_products(state, out, clock())?;

    let Some(line) = prompt(input, out, "Enter product number to add: ")? else {
        return Ok(None);
    };
    let number = match parse_product_number(&line, state.catalog.len()) {
        Ok(n) => n,
        Err(e) => return Ok(Some(Err(e.into()))),
    };

    let name = state
        .catalog
        .nth(number)
        .map(|p| p.name.clone())
        .unwrap_or_default();
    let Some(line) = prompt(input, out, &format!("Enter quantity for {}: ", name))? else {
        return Ok(None);
    };
    let quantity = match parse_quantity(&line) {
        Ok(q) => q,
        Err(e) => return Ok(Some(Err(e.into()))),
    };

    let result = handlers::add_to_cart(state, number, quantity).and_then(|name| {
        writeln!(out, "Added {} x {} to cart.", quantity, name)?;
        Ok(())
    });
    Ok(Some(result))
}
