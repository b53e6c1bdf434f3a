//! Interest rate determination.
//!
//! This module provides the [`RateResolver`], which prices an applicant as
//! the caller's reference rate plus a policy spread. Spreads are looked up
//! in two tiers: an exact table match, then the table's named default, so
//! pricing never fails.

use rust_decimal::Decimal;

use crate::config::RatesConfig;
use crate::models::{
    Applicant, ApplicantType, Category, CibilSlab, RateQuote, SalaryChannel, SpreadSource,
};

/// Resolves priced rates against one policy's spread tables.
#[derive(Debug, Clone, Copy)]
pub struct RateResolver<'a> {
    rates: &'a RatesConfig,
}

impl<'a> RateResolver<'a> {
    /// Creates a resolver over the given spread tables.
    pub fn new(rates: &'a RatesConfig) -> Self {
        Self { rates }
    }

    /// Prices an applicant, recording where the spread came from.
    ///
    /// Salaried applicants are keyed by employer category (absent treated as
    /// C), salary channel and CIBIL slab. Every other applicant is keyed by
    /// slab alone, falling back to the no-track-record spread.
    ///
    /// # Example
    ///
    /// ```
    /// use loan_engine::calculation::RateResolver;
    /// use loan_engine::config::ConfigLoader;
    /// use loan_engine::models::{Applicant, ApplicantType, Category, SpreadSource};
    /// use rust_decimal::Decimal;
    ///
    /// let loader = ConfigLoader::builtin()?;
    /// let resolver = RateResolver::new(loader.config().rates());
    ///
    /// let mut applicant = Applicant::new("Asha", ApplicantType::Salaried, 34);
    /// applicant.category = Some(Category::A);
    /// applicant.salary_account_with_bank = true;
    /// applicant.cibil_score = Some(810);
    ///
    /// let quote = resolver.quote(&applicant, Decimal::new(1015, 2));
    /// assert_eq!(quote.spread, Decimal::new(70, 2));
    /// assert_eq!(quote.annual_rate_percent, Decimal::new(1085, 2));
    /// assert_eq!(quote.source, SpreadSource::Table);
    /// # Ok::<(), loan_engine::error::EngineError>(())
    /// ```
    pub fn quote(&self, applicant: &Applicant, base_rate: Decimal) -> RateQuote {
        let slab = CibilSlab::from_score(applicant.cibil_score);
        let (spread, source) = match applicant.applicant_type {
            ApplicantType::Salaried => self.salaried_spread(applicant, slab),
            ApplicantType::Professional | ApplicantType::Unrecognized(_) => {
                self.professional_spread(slab)
            }
        };

        RateQuote {
            base_rate,
            spread,
            annual_rate_percent: base_rate.saturating_add(spread),
            slab,
            source,
        }
    }

    /// The priced annual rate in percent.
    pub fn resolve_rate(&self, applicant: &Applicant, base_rate: Decimal) -> Decimal {
        self.quote(applicant, base_rate).annual_rate_percent
    }

    fn salaried_spread(&self, applicant: &Applicant, slab: CibilSlab) -> (Decimal, SpreadSource) {
        let table = &self.rates.salaried;
        let category = applicant.category.unwrap_or(Category::C);
        let channel = SalaryChannel::from_flag(applicant.salary_account_with_bank);

        match table.lookup(category, channel, slab) {
            Some(spread) => (spread, SpreadSource::Table),
            None => (table.default_spread, SpreadSource::Fallback),
        }
    }

    fn professional_spread(&self, slab: CibilSlab) -> (Decimal, SpreadSource) {
        let table = &self.rates.professional;
        if let Some(spread) = table.spreads.get(&slab) {
            return (*spread, SpreadSource::Table);
        }
        let spread = table
            .spreads
            .get(&CibilSlab::NoTrackRecord)
            .copied()
            .unwrap_or(table.default_spread);
        (spread, SpreadSource::Fallback)
    }
}
