// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use csv::Writer;
use ledger_reader_rs::{
    Book, Document, FixedPointDecimal, Ledger, Transaction, TransactionError, sort_newest_first,
    sort_oldest_first,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Ledger Reader - Report transactions of a parsed ledger document
///
/// Reads the JSON rendering of a parsed document tree and writes one CSV row
/// per transaction to stdout, latest posting first.
#[derive(Parser, Debug)]
#[command(name = "ledger-reader-rs")]
#[command(about = "Reports balances and invoice links of ledger transactions", long_about = None)]
struct Args {
    /// Path to the parsed document (JSON)
    ///
    /// Expected shape: {"invoices": [...], "transactions": [...]}
    /// Example: cargo run -- book.json > transactions.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// List the oldest transaction first
    #[arg(long)]
    oldest_first: bool,
}

#[derive(Debug, Error)]
enum ReportError {
    #[error("cannot read document: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot write report: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ledger_reader_rs=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            error!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let document = match read_document(BufReader::new(file)) {
        Ok(document) => document,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let book = Book::new();
    let mut transactions = match book.load_document(document) {
        Ok(transactions) => transactions,
        Err(e) => {
            error!("Error loading transactions: {}", e);
            process::exit(1);
        }
    };
    info!(
        transactions = transactions.len(),
        invoices = book.invoice_count(),
        "document loaded"
    );

    if args.oldest_first {
        sort_oldest_first(&mut transactions);
    } else {
        sort_newest_first(&mut transactions);
    }

    if let Err(e) = write_transactions(&transactions, std::io::stdout()) {
        error!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Deserializes a parsed document tree from JSON.
fn read_document<R: Read>(reader: R) -> Result<Document, ReportError> {
    Ok(serde_json::from_reader(reader)?)
}

/// One output row per transaction.
#[derive(Debug, Serialize)]
struct TransactionRow<'a> {
    id: &'a str,
    date_posted: String,
    description: &'a str,
    currency: &'a str,
    splits: usize,
    balance: FixedPointDecimal,
    balanced: bool,
    /// Space-separated invoice ids.
    invoices: String,
}

impl<'a> TransactionRow<'a> {
    fn new<L: Ledger + ?Sized>(transaction: &'a Transaction<'_, L>) -> Result<Self, TransactionError> {
        let invoices = transaction
            .invoice_ids()
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let balance = transaction.balance()?;
        Ok(Self {
            id: transaction.id().as_str(),
            date_posted: transaction.date_posted_formatted()?,
            description: transaction.description(),
            currency: transaction.currency_id(),
            splits: transaction.split_count(),
            balance,
            balanced: balance.is_zero(),
            invoices,
        })
    }
}

/// Writes transactions as CSV.
///
/// # CSV Format
///
/// Columns: `id, date_posted, description, currency, splits, balance, balanced, invoices`
///
/// # Errors
///
/// Fails on the first transaction with a malformed posted date or an inexact
/// balance, or if writing fails.
fn write_transactions<L: Ledger + ?Sized, W: Write>(
    transactions: &[Transaction<'_, L>],
    writer: W,
) -> Result<(), ReportError> {
    let mut wtr = Writer::from_writer(writer);

    for transaction in transactions {
        wtr.serialize(TransactionRow::new(transaction)?)?;
    }

    wtr.flush()?;
    Ok(())
}
