use std::io::Write;

use anyhow::{Context, Result};
use finfolio_core::db::{DbConfig, MemoryRepositoryFactory, RepositoryRegistry};
use finfolio_core::{Investment, InvestmentRepository, NewInvestment, PortfolioService};
use finfolio_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use tracing::debug;

use crate::utils::{date, money, opt_money, opt_percent};

/// Builds a [`RepositoryRegistry`] with every backend this binary ships.
///
/// Add new backends here; the rest of the application never needs to know
/// which ones exist.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(MemoryRepositoryFactory));
    registry
}

/// Opens the configured store for the duration of one command. The caller
/// releases it with [`InvestmentRepository::close`].
pub async fn open_repository(config: &DbConfig) -> Result<Box<dyn InvestmentRepository>> {
    debug!(backend = %config.backend, "opening repository");
    build_registry().create(config).await.with_context(|| {
        format!(
            "cannot open {} store '{}'",
            config.backend, config.connection_string
        )
    })
}

pub async fn record(
    repo: &dyn InvestmentRepository,
    draft: NewInvestment,
    out: &mut impl Write,
) -> Result<()> {
    let investment = PortfolioService::new(repo)
        .record(draft)
        .await
        .context("failed to save investment")?;

    writeln!(out, "Recorded investment #{}", investment.id)?;
    write_details(out, &investment)?;
    Ok(())
}

pub async fn settle(
    repo: &dyn InvestmentRepository,
    id: i64,
    gross_return: Decimal,
    tax: Decimal,
    out: &mut impl Write,
) -> Result<()> {
    let investment = PortfolioService::new(repo)
        .settle(id, gross_return, tax)
        .await
        .with_context(|| format!("failed to settle investment #{id}"))?;

    writeln!(out, "Settled investment #{}", investment.id)?;
    write_details(out, &investment)?;
    Ok(())
}

pub async fn show(
    repo: &dyn InvestmentRepository,
    id: i64,
    out: &mut impl Write,
) -> Result<()> {
    let investment = PortfolioService::new(repo)
        .get(id)
        .await
        .with_context(|| format!("failed to load investment #{id}"))?;

    write_details(out, &investment)?;
    Ok(())
}

pub async fn list(
    repo: &dyn InvestmentRepository,
    out: &mut impl Write,
) -> Result<()> {
    let service = PortfolioService::new(repo);
    let investments = service.list().await.context("failed to list investments")?;

    if investments.is_empty() {
        writeln!(out, "No investments recorded.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:>4}  {:<10}  {:<10}  {:<12}  {:<18}  {:>12}  {:>10}  {:>10}",
        "ID", "Applied", "Redeems", "Bank", "Title", "Value", "Net", "Annual"
    )?;
    for inv in &investments {
        let returns = inv.returns.as_ref();
        writeln!(
            out,
            "{:>4}  {:<10}  {:<10}  {:<12}  {:<18}  {:>12}  {:>10}  {:>10}",
            inv.id,
            date(inv.application_date),
            date(inv.redemption_date),
            truncate(&inv.bank, 12),
            truncate(&inv.title, 18),
            money(inv.value),
            opt_money(returns.map(|r| r.net_return)),
            opt_percent(returns.and_then(|r| r.annualized_rate)),
        )?;
    }

    let summary = service
        .summary()
        .await
        .context("failed to summarize investments")?;
    writeln!(
        out,
        "\n{} investments ({} settled), invested {}, net return {}",
        summary.investments,
        summary.settled,
        money(summary.total_invested),
        money(summary.total_net_return),
    )?;
    Ok(())
}

fn write_details(
    out: &mut impl Write,
    inv: &Investment,
) -> Result<()> {
    let returns = inv.returns.as_ref();
    let rows = [
        ("Bank", inv.bank.clone()),
        ("Title", inv.title.clone()),
        ("Application Date", date(inv.application_date)),
        ("Redemption Date", date(inv.redemption_date)),
        ("Period", format!("{} days", inv.period_days)),
        ("Value", money(inv.value)),
        ("Status", inv.status().as_str().to_string()),
        ("Gross Return", opt_money(returns.map(|r| r.gross_return))),
        ("Tax", opt_money(returns.map(|r| r.tax))),
        ("Net Return", opt_money(returns.map(|r| r.net_return))),
        ("Return", opt_percent(returns.and_then(|r| r.return_percent))),
        ("Annualized", opt_percent(returns.and_then(|r| r.annualized_rate))),
    ];

    writeln!(out, "Investment #{}", inv.id)?;
    for (label, value) in rows {
        writeln!(out, "  {:<18}{}", format!("{label}:"), value)?;
    }
    Ok(())
}

fn truncate(
    text: &str,
    width: usize,
) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
