use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use super::{
    api::{OrderLineSummary, OrderSummary},
    view::ViewState,
};

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login to view your orders";
pub const LOADING_MESSAGE: &str = "Loading orders...";
pub const EMPTY_TITLE: &str = "No orders yet";
pub const EMPTY_HINT: &str = "Your order history will appear here";
pub const RETRY_LABEL: &str = "Try Again";
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

const DATE_FORMAT: &str = "%d %b %Y";

/// Colour of an order status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Yellow,
    Blue,
    Cyan,
    Purple,
    Indigo,
    Green,
    Red,
    Gray,
}

impl BadgeTone {
    pub fn for_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "pending" => BadgeTone::Yellow,
            "placed" => BadgeTone::Blue,
            "confirmed" => BadgeTone::Cyan,
            "processing" => BadgeTone::Purple,
            "shipped" => BadgeTone::Indigo,
            "delivered" => BadgeTone::Green,
            "cancelled" => BadgeTone::Red,
            _ => BadgeTone::Gray,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            BadgeTone::Yellow => "bg-yellow-100 text-yellow-800",
            BadgeTone::Blue => "bg-blue-100 text-blue-800",
            BadgeTone::Cyan => "bg-cyan-100 text-cyan-800",
            BadgeTone::Purple => "bg-purple-100 text-purple-800",
            BadgeTone::Indigo => "bg-indigo-100 text-indigo-800",
            BadgeTone::Green => "bg-green-100 text-green-800",
            BadgeTone::Red => "bg-red-100 text-red-800",
            BadgeTone::Gray => "bg-gray-100 text-gray-800",
        }
    }
}

/// First letter upper-cased, the rest as sent.
pub fn status_label(status: &str) -> String {
    let mut chars = status.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormatter {
    symbol: String,
}

impl PriceFormatter {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into() }
    }

    pub fn format(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.symbol, amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub tone: BadgeTone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLine {
    pub image: String,
    pub name: String,
    /// `{quantity} × {price}`
    pub quantity_line: String,
    pub subtotal: String,
}

impl CardLine {
    fn build(line: &OrderLineSummary, prices: &PriceFormatter) -> Self {
        let current = line.product.as_ref();
        let image = current
            .and_then(|product| product.image.clone())
            .or_else(|| line.image.clone())
            .filter(|image| !image.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
        let name = current
            .and_then(|product| product.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| line.name.clone());

        Self {
            image,
            name,
            quantity_line: format!("{} × {}", line.quantity, prices.format(line.price_per_unit)),
            subtotal: prices.format(line.subtotal),
        }
    }
}

/// Everything one order card shows, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCard {
    pub title: String,
    pub invoice: Option<String>,
    pub date: Option<String>,
    pub badge: StatusBadge,
    pub lines: Vec<CardLine>,
    /// Present only when a subtotal was sent and differs from the total.
    pub subtotal: Option<String>,
    pub total: String,
    pub delivered_to: Option<String>,
    pub address_line: Option<String>,
}

fn order_title(order: &OrderSummary) -> String {
    if let Some(code) = order.order_id.as_deref().filter(|code| !code.is_empty()) {
        return code.to_string();
    }
    match order.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let start = id.char_indices().rev().nth(7).map_or(0, |(index, _)| index);
            format!("Order #{}", &id[start..])
        }
        None => "N/A".to_string(),
    }
}

impl OrderCard {
    pub fn build(order: &OrderSummary, prices: &PriceFormatter) -> Self {
        let subtotal = order
            .subtotal_amount
            .filter(|subtotal| !subtotal.is_zero() && *subtotal != order.total_amount)
            .map(|subtotal| prices.format(subtotal));

        let address = order.shipping_address.as_ref();
        let delivered_to = address.and_then(|a| a.name.clone());
        let address_line = address.and_then(|a| match (a.address.as_deref(), a.city.as_deref()) {
            (Some(street), Some(city)) => Some(format!("{}, {}", street, city)),
            (Some(street), None) => Some(street.to_string()),
            (None, Some(city)) => Some(city.to_string()),
            (None, None) => None,
        });

        Self {
            title: order_title(order),
            invoice: order.invoice_id.clone().filter(|invoice| !invoice.is_empty()),
            date: order.created_at.map(|at| at.format(DATE_FORMAT).to_string()),
            badge: StatusBadge {
                label: status_label(&order.status),
                tone: BadgeTone::for_status(&order.status),
            },
            lines: order.items.iter().map(|line| CardLine::build(line, prices)).collect(),
            subtotal,
            total: prices.format(order.total_amount),
            delivered_to,
            address_line,
        }
    }
}

impl fmt::Display for OrderCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}  [{}]", self.title, self.badge.label)?;
        if let Some(invoice) = &self.invoice {
            writeln!(f, "Invoice: {}", invoice)?;
        }
        if let Some(date) = &self.date {
            writeln!(f, "{}", date)?;
        }
        for line in &self.lines {
            writeln!(f, "  {}  {}  {}", line.name, line.quantity_line, line.subtotal)?;
        }
        if let Some(subtotal) = &self.subtotal {
            writeln!(f, "Subtotal: {}", subtotal)?;
        }
        writeln!(f, "Total: {}", self.total)?;
        if let Some(name) = &self.delivered_to {
            writeln!(f, "Delivered to: {}", name)?;
        }
        if let Some(address) = &self.address_line {
            writeln!(f, "{}", address)?;
        }
        Ok(())
    }
}

/// Plain-text rendering of the whole history page.
pub fn render_state(state: &ViewState, prices: &PriceFormatter) -> String {
    match state {
        ViewState::LoginRequired => LOGIN_REQUIRED_MESSAGE.to_string(),
        ViewState::Loading => LOADING_MESSAGE.to_string(),
        ViewState::Empty => format!("{}\n{}", EMPTY_TITLE, EMPTY_HINT),
        ViewState::Failed(message) => format!("{}\n[{}]", message, RETRY_LABEL),
        ViewState::Loaded(orders) => orders
            .iter()
            .map(|order| OrderCard::build(order, prices).to_string())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
