//! Plain-text rendering for command output.

use std::io::{self, Write};

use crate::domain::{
    CatalogHit, Order, OrderStats, QuizRecommendation, Route, RouteDecision, User,
};

pub(super) fn user(out: &mut dyn Write, user: Option<&User>) -> io::Result<()> {
    match user {
        Some(user) => writeln!(out, "{} <{}> [{}]", user.display_name(), user.email, user.role),
        None => writeln!(out, "not logged in"),
    }
}

pub(super) fn decision(out: &mut dyn Write, route: Route, decision: RouteDecision) -> io::Result<()> {
    writeln!(out, "{route} -> {}", describe(&decision))
}

pub(super) fn describe(decision: &RouteDecision) -> String {
    match *decision {
        RouteDecision::Pending => "pending (session not restored yet)".to_owned(),
        RouteDecision::Render(route) => format!("render {route}"),
        RouteDecision::RedirectToLogin => format!("redirect to {}", Route::Login),
        RouteDecision::RedirectTo(route) => format!("redirect to {route}"),
        RouteDecision::AccessDenied { fallback } => format!("access denied (back to {fallback})"),
    }
}

pub(super) fn order(out: &mut dyn Write, order: &Order) -> io::Result<()> {
    writeln!(
        out,
        "{id}  {status:<7}  {kind:<11} x{quantity}  {price:>7.2} EUR  {name} <{email}> {phone}",
        id = order.id,
        status = order.status.as_str(),
        kind = order.order_type.as_str(),
        quantity = order.quantity,
        price = order.price,
        name = order.name,
        email = order.email,
        phone = order.phone,
    )
}

pub(super) fn orders(out: &mut dyn Write, orders: &[&Order]) -> io::Result<()> {
    if orders.is_empty() {
        return writeln!(out, "no orders");
    }
    for entry in orders {
        order(out, entry)?;
    }
    Ok(())
}

pub(super) fn stats(out: &mut dyn Write, stats: &OrderStats) -> io::Result<()> {
    writeln!(
        out,
        "total {}  pending {}  open {}  closed {}  revenue {:.2} EUR",
        stats.total, stats.pending, stats.open, stats.closed, stats.revenue
    )
}

pub(super) fn catalog(out: &mut dyn Write, hits: &[CatalogHit<'_>]) -> io::Result<()> {
    if hits.is_empty() {
        return writeln!(out, "no items");
    }
    for hit in hits {
        let mut location = format!("{} / {}", hit.category.name, hit.subcategory.name);
        if let Some(subsection) = hit.subsection {
            location.push_str(" / ");
            location.push_str(&subsection.name);
        }
        writeln!(out, "{location}: {} {:.2} EUR", hit.item.name, hit.item.price)?;
    }
    Ok(())
}

pub(super) fn recommendation(out: &mut dyn Write, recommendation: &QuizRecommendation) -> io::Result<()> {
    let order_type = recommendation.order_type;
    writeln!(
        out,
        "{order_type} package ({} EUR per shisha): {}",
        order_type.unit_price(),
        recommendation.flavors.join(", ")
    )?;
    writeln!(out, "includes: {}", order_type.food().join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::admin_user;
    use rstest::rstest;

    fn rendered(write: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer).expect("write to buffer");
        String::from_utf8(buffer).expect("utf-8 output")
    }

    #[rstest]
    #[case(RouteDecision::Render(Route::Menu), "render /menu")]
    #[case(RouteDecision::RedirectToLogin, "redirect to /login")]
    #[case(RouteDecision::AccessDenied { fallback: Route::Dashboard }, "access denied (back to /dashboard)")]
    fn describes_decisions(#[case] decision: RouteDecision, #[case] expected: &str) {
        assert_eq!(describe(&decision), expected);
    }

    #[rstest]
    fn user_line_falls_back_to_email() {
        let admin = admin_user();
        assert_eq!(
            rendered(|out| user(out, Some(&admin))),
            "admin@test.com <admin@test.com> [ADMIN]\n"
        );
        assert_eq!(rendered(|out| user(out, None)), "not logged in\n");
    }
}
