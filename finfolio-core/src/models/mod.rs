mod investment;

pub use investment::{DATE_FORMAT, Investment, InvestmentStatus, NewInvestment};
