//! Command execution against the domain services.
//!
//! Admin commands are gated through the same role check the route guard
//! uses, so a customer session is refused before any request is sent.

use std::io::{self, Write};

use tracing::debug;

use super::args::{CatalogCommand, Command, OrdersCommand};
use super::render;
use crate::domain::{
    ActivityTracker, ApiError, AuthService, CatalogFilter, CatalogService, FormValidationError,
    LoginCredentials, OrderFilter, OrderForm, OrderService, QuizAnswers, Registration, ResourceId,
    Route, RouteDecision, SessionStore, SubmitOrderError, UnknownRoute, decide_route,
};

/// Borrowed services a command runs against.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    /// Shared session.
    pub session: &'a SessionStore,
    /// Auth endpoints.
    pub auth: &'a AuthService,
    /// Order endpoints.
    pub orders: &'a OrderService,
    /// Catalogue endpoints.
    pub catalog: &'a CatalogService,
    /// Activity throttle.
    pub activity: &'a ActivityTracker,
}

/// Why a command failed.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Input rejected before any request was sent.
    #[error(transparent)]
    Invalid(#[from] FormValidationError),
    /// The backend rejected the request or could not be reached.
    #[error("{}", .0.message())]
    Api(#[from] ApiError),
    /// The path names no route.
    #[error(transparent)]
    Route(#[from] UnknownRoute),
    /// The session may not use this command.
    #[error("{route}: {}", render::describe(.decision))]
    Denied {
        /// Route guarding the command.
        route: Route,
        /// What the guard decided.
        decision: RouteDecision,
    },
    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl From<SubmitOrderError> for CliError {
    fn from(value: SubmitOrderError) -> Self {
        match value {
            SubmitOrderError::Invalid(error) => Self::Invalid(error),
            SubmitOrderError::Api(error) => Self::Api(error),
        }
    }
}

/// Run one command, writing its output to `out`.
///
/// # Errors
///
/// Returns [`CliError`] when validation, the role gate, the backend, or the
/// output sink fails.
pub async fn execute(
    command: Command,
    ctx: CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if ctx.activity.record_interaction(ctx.session) {
        debug!("session activity recorded");
    }
    match command {
        Command::Login { email, password } => {
            let credentials = LoginCredentials::try_from_parts(&email, &password)?;
            let response = ctx.auth.login(&credentials).await?;
            write!(out, "logged in as ")?;
            render::user(out, Some(&response.user))?;
        }
        Command::Register {
            email,
            password,
            name,
        } => {
            let registration = Registration::try_from_parts(&email, &password, name.as_deref())?;
            let response = ctx.auth.register(&registration).await?;
            write!(out, "registered ")?;
            render::user(out, Some(&response.user))?;
        }
        Command::Logout => {
            ctx.auth.logout().await;
            writeln!(out, "logged out")?;
        }
        Command::Whoami => {
            let user = ctx.auth.get_current_user().await;
            render::user(out, user.as_ref())?;
        }
        Command::Route { path } => {
            let route = Route::from_path(&path)?;
            render::decision(out, route, decide_route(&ctx.session.snapshot(), route))?;
        }
        Command::Catalog(command) => catalog(command, ctx, out).await?,
        Command::Orders(command) => orders(command, ctx, out).await?,
        Command::Quiz {
            intensity,
            family,
            occasion,
        } => {
            let answers = QuizAnswers {
                intensity,
                flavor_family: family,
                occasion,
            };
            render::recommendation(out, &answers.recommend())?;
        }
    }
    Ok(())
}

async fn catalog(
    command: CatalogCommand,
    ctx: CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        CatalogCommand::List { search, category } => {
            require(ctx.session, Route::Menu)?;
            let categories = ctx.catalog.list().await?;
            let hits = CatalogFilter { search, category }.apply(&categories);
            render::catalog(out, &hits)?;
        }
    }
    Ok(())
}

async fn orders(
    command: OrdersCommand,
    ctx: CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        OrdersCommand::Create {
            name,
            phone,
            email,
            quantity,
            order_type,
            observations,
        } => {
            require(ctx.session, Route::OrderForm)?;
            let form = OrderForm {
                name,
                phone,
                email,
                quantity,
                observations,
                order_type,
            };
            let created = ctx.orders.submit(form).await?;
            render::order(out, &created)?;
        }
        OrdersCommand::List { status, search } => {
            require(ctx.session, Route::AdminOrders)?;
            let all = ctx.orders.list().await?;
            render::orders(out, &OrderFilter { status, search }.apply(&all))?;
        }
        OrdersCommand::Close { id } => {
            require(ctx.session, Route::AdminOrders)?;
            let order = ctx.orders.close(&ResourceId::from(id.as_str())).await?;
            render::order(out, &order)?;
        }
        OrdersCommand::Reopen { id } => {
            require(ctx.session, Route::AdminOrders)?;
            let order = ctx.orders.reopen(&ResourceId::from(id.as_str())).await?;
            render::order(out, &order)?;
        }
        OrdersCommand::Delete { id } => {
            require(ctx.session, Route::AdminOrders)?;
            ctx.orders.delete(&ResourceId::from(id.as_str())).await?;
            writeln!(out, "deleted {id}")?;
        }
        OrdersCommand::Stats => {
            require(ctx.session, Route::AdminOrders)?;
            render::stats(out, &ctx.orders.stats().await?)?;
        }
    }
    Ok(())
}

fn require(session: &SessionStore, route: Route) -> Result<(), CliError> {
    match decide_route(&session.snapshot(), route) {
        RouteDecision::Render(_) => Ok(()),
        decision => Err(CliError::Denied { route, decision }),
    }
}

#[cfg(test)]
mod tests;
