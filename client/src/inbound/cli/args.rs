//! Clap argument definitions.

use clap::{Parser, Subcommand};

use crate::domain::{FlavorFamily, Intensity, Occasion, OrderStatus, OrderType};

/// `ego-house` arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ego-house",
    about = "Back-office client for the EGO HOUSE venue",
    version
)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Log in and persist the session.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in.
    Register {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
        /// Display name.
        #[arg(long)]
        name: Option<String>,
    },
    /// End the session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Show what the role gate decides for a path.
    Route {
        /// Path such as `/admin/orders`.
        path: String,
    },
    /// Browse the menu.
    #[command(subcommand)]
    Catalog(CatalogCommand),
    /// Submit and manage orders.
    #[command(subcommand)]
    Orders(OrdersCommand),
    /// Get a package and flavour suggestion.
    Quiz {
        /// soft, medium or intense.
        #[arg(long)]
        intensity: Intensity,
        /// fruity, fresh, sweet or spiced.
        #[arg(long)]
        family: FlavorFamily,
        /// casual, group or special.
        #[arg(long)]
        occasion: Occasion,
    },
}

/// `catalog` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CatalogCommand {
    /// List menu items.
    List {
        /// Text matched against item names and descriptions.
        #[arg(long)]
        search: Option<String>,
        /// Category slug to restrict to.
        #[arg(long)]
        category: Option<String>,
    },
}

/// `orders` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum OrdersCommand {
    /// List orders (admin).
    List {
        /// pending, open or closed.
        #[arg(long)]
        status: Option<OrderStatus>,
        /// Text matched against name, phone and email.
        #[arg(long)]
        search: Option<String>,
    },
    /// Submit an order.
    Create {
        /// Customer name.
        #[arg(long)]
        name: String,
        /// Contact phone.
        #[arg(long)]
        phone: String,
        /// Contact email.
        #[arg(long)]
        email: String,
        /// Number of shishas.
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        /// classic, traditional or premium.
        #[arg(long = "type")]
        order_type: OrderType,
        /// Free-text notes.
        #[arg(long)]
        observations: Option<String>,
    },
    /// Close an order (admin).
    Close {
        /// Order identifier.
        id: String,
    },
    /// Reopen an order (admin).
    Reopen {
        /// Order identifier.
        id: String,
    },
    /// Delete an order (admin).
    Delete {
        /// Order identifier.
        id: String,
    },
    /// Order totals and revenue (admin).
    Stats,
}
