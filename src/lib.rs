/*!
# Domain Analytics Dashboard

A login-gated web dashboard that shows per-domain traffic figures taken from
a published spreadsheet CSV export, built in Rust.

## Overview

The server fetches the sheet once when the dashboard is first opened, parses
it into records and keeps them in memory. Every page view then derives a
filtered and sorted table from that list. Nothing is written back anywhere.

## Architecture

### Session gate
- One process-wide authenticated flag, closed at start-up
- Submitting the login form opens it, logging out closes it
- Middleware redirects unauthenticated dashboard requests to the login page

### Data ingestion
- A `CsvSource` (HTTP export or local file) supplies the raw text
- A quote-aware parser splits it into rows; the header row is dropped
- Counts are coerced to integers; unparsable counts show as `NaN`
- The record list is replaced wholesale on every load

### Table view
- Global, case-insensitive search across every column
- Per-column sort cycling none -> ascending -> descending -> none
- State lives in the query string, so every view is a plain link

## Modules

- **record**: the Record entity, columns and count formatting
- **loader**: CSV parsing and record construction
- **table**: global filter and column sorting
- **downloader**: CSV and XLSX export of the current view
- **ingest**: where the CSV text comes from
- **dashboard**: the in-memory record store and its load lifecycle
- **login**: the session gate and login/logout handlers
- **templates**: HTML pages
- **app**: routing and request handlers
- **config**: command line and environment configuration

## Routes

- `/` - Login form (GET) and submission (POST)
- `/logout` - Close the session gate
- `/dashboard` - The table, with `q`, `sort` and `dir` query parameters
- `/dashboard/reload` - Fetch the sheet again
- `/dashboard/export.csv`, `/dashboard/export.xlsx` - Download the current view
- `/api/records` - The current view as JSON
*/

pub mod downloader;
pub mod loader;
pub mod record;
pub mod table;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod config;
#[cfg(feature = "web")]
pub mod dashboard;
#[cfg(feature = "web")]
pub mod error;
#[cfg(feature = "web")]
pub mod ingest;
#[cfg(feature = "web")]
pub mod login;
#[cfg(feature = "web")]
pub mod templates;

pub use record::{Column, Record};
pub use table::{SortDirection, SortState, TableView};
