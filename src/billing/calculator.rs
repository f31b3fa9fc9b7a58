use super::errors::BillingError;
use super::period::{days_in_month, MAX_BILLING_YEAR, MIN_BILLING_YEAR};
use super::resolver::ProviderConfigResolver;
use super::types::{
    AppliedRules, BillBreakdown, BillResult, BillingRequest, Provider, Slab, SlabCharge,
    TIMELY_PAYMENT_REBATE,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Everything read from the configuration store for one bill.
#[derive(Debug, Clone)]
pub struct TariffInputs {
    pub provider: Provider,
    pub slabs: Vec<Slab>,
    pub fppca_rate: Option<Decimal>,
    pub duty_percentages: Vec<Decimal>,
    /// Already gated on provider support and the customer's opt-in
    pub timely_rebate_percent: Option<Decimal>,
}

pub struct BillCalculator {
    resolver: Arc<dyn ProviderConfigResolver>,
}

impl BillCalculator {
    pub fn new(resolver: Arc<dyn ProviderConfigResolver>) -> Self {
        Self { resolver }
    }

    pub async fn calculate(&self, request: &BillingRequest) -> Result<BillResult, BillingError> {
        validate_request(request)?;
        let month = billing_month(request)?;
        debug!(
            provider = %request.provider_code,
            year = request.year,
            month = request.month,
            "Calculating bill"
        );

        let provider = self
            .resolver
            .active_provider(&request.provider_code)
            .await
            .map_err(|e| {
                error!("Provider lookup failed for {}: {}", request.provider_code, e);
                BillingError::from(e)
            })?
            .filter(|provider| provider.is_active)
            .ok_or_else(|| BillingError::ProviderNotFound(request.provider_code.clone()))?;

        let wants_timely_rebate = provider.supports_timely_rebate && request.timely_payment_opt_in;

        // independent reads, only the provider had to come first
        let (slabs, fppca_rate, duty_percentages, timely_rebate_percent) = tokio::try_join!(
            self.load_slabs(&provider),
            async {
                self.resolver
                    .fppca_rate(&provider, request.year, month)
                    .await
                    .map_err(BillingError::from)
            },
            async {
                self.resolver
                    .duty_percentages(&provider)
                    .await
                    .map_err(BillingError::from)
            },
            async {
                if !wants_timely_rebate {
                    return Ok(None);
                }
                self.resolver
                    .active_rebate_percent(&provider, TIMELY_PAYMENT_REBATE)
                    .await
                    .map_err(BillingError::from)
            },
        )?;

        compute_bill(
            request,
            &TariffInputs {
                provider,
                slabs,
                fppca_rate,
                duty_percentages,
                timely_rebate_percent,
            },
        )
    }

    async fn load_slabs(&self, provider: &Provider) -> Result<Vec<Slab>, BillingError> {
        let slabs = self.resolver.slabs(provider).await.map_err(|e| {
            error!("Slab lookup failed for {}: {}", provider.code, e);
            BillingError::SlabLoadFailure(e.to_string())
        })?;
        if slabs.is_empty() {
            return Err(BillingError::SlabLoadFailure(format!(
                "no slabs configured for {}",
                provider.code
            )));
        }
        Ok(slabs)
    }
}

pub fn validate_request(request: &BillingRequest) -> Result<(), BillingError> {
    if !(MIN_BILLING_YEAR..=MAX_BILLING_YEAR).contains(&request.year) {
        return Err(BillingError::InvalidYear(request.year));
    }
    billing_month(request)?;
    if request.units_kwh < Decimal::ZERO {
        return Err(BillingError::NegativeUnits);
    }
    if request.sanctioned_load_kva < Decimal::ZERO {
        return Err(BillingError::NegativeLoad);
    }
    Ok(())
}

fn billing_month(request: &BillingRequest) -> Result<u32, BillingError> {
    u32::try_from(request.month)
        .ok()
        .filter(|month| (1..=12).contains(month))
        .ok_or(BillingError::InvalidMonth(request.month))
}

fn checked(value: Option<Decimal>) -> Result<Decimal, BillingError> {
    value.ok_or(BillingError::AmountOverflow)
}

/// Assembles the itemized bill. Intermediate values stay unrounded; every
/// output figure is rounded once here.
pub fn compute_bill(
    request: &BillingRequest,
    inputs: &TariffInputs,
) -> Result<BillResult, BillingError> {
    validate_request(request)?;
    let month = billing_month(request)?;
    let days_in_month =
        days_in_month(request.year, month).ok_or(BillingError::InvalidMonth(request.month))?;
    let provider = &inputs.provider;
    let units = request.units_kwh;

    let lifeline_applied = provider.lifeline_applies(units, request.is_lifeline_registered);

    let (energy_charge, slab_wise) = walk_slabs(&inputs.slabs, units)?;

    let fixed_charge = checked(
        request
            .sanctioned_load_kva
            .checked_mul(provider.fixed_charge_per_kva),
    )?;

    let fppca_charge = match inputs.fppca_rate {
        Some(rate) => checked(units.checked_mul(rate))?,
        None => {
            warn!(
                provider = %provider.code,
                year = request.year,
                month = request.month,
                "FPPCA rate missing, billing without surcharge"
            );
            Decimal::ZERO
        }
    };

    let chargeable = checked(energy_charge.checked_add(fixed_charge))?;
    let total_duty_percent = inputs
        .duty_percentages
        .iter()
        .try_fold(Decimal::ZERO, |sum, percent| checked(sum.checked_add(*percent)))?;
    let duty_charge = percent_of(chargeable, total_duty_percent)?;

    let meter_rent = provider.meter_rent;

    let mut rebates = BTreeMap::new();
    if let Some(percent) = inputs.timely_rebate_percent {
        rebates.insert(
            TIMELY_PAYMENT_REBATE.to_string(),
            percent_of(chargeable, percent)?,
        );
    }
    let timely_payment_applied = rebates.contains_key(TIMELY_PAYMENT_REBATE);
    let total_rebate = rebates
        .values()
        .try_fold(Decimal::ZERO, |sum, amount| checked(sum.checked_add(*amount)))?;

    let total_before_rebate = [fppca_charge, duty_charge, meter_rent]
        .into_iter()
        .try_fold(chargeable, |sum, charge| checked(sum.checked_add(charge)))?;
    let total_payable = checked(total_before_rebate.checked_sub(total_rebate))?;

    debug!(
        provider = %provider.code,
        %energy_charge,
        %total_payable,
        "Bill computed"
    );

    Ok(BillResult {
        provider_code: request.provider_code.clone(),
        year: request.year,
        month,
        days_in_month,
        units_kwh: units,
        breakdown: BillBreakdown {
            energy_charge: round_money(energy_charge),
            fixed_charge: round_money(fixed_charge),
            fppca_charge: round_money(fppca_charge),
            duty_charge: round_money(duty_charge),
            meter_rent: round_money(meter_rent),
            rebates: rebates
                .into_iter()
                .map(|(code, amount)| (code, round_money(amount)))
                .collect(),
        },
        total_before_rebate: round_money(total_before_rebate),
        total_rebate: round_money(total_rebate),
        total_payable: round_money(total_payable),
        applied_rules: AppliedRules {
            lifeline_applied,
            timely_payment_applied,
        },
        slab_wise,
        fppca_missing: inputs.fppca_rate.is_none(),
    })
}

/// Spreads `units` over the slabs in ascending order. Returns the unrounded
/// energy charge and the per-slab lines.
pub fn walk_slabs(slabs: &[Slab], units: Decimal) -> Result<(Decimal, Vec<SlabCharge>), BillingError> {
    let mut ordered: Vec<&Slab> = slabs.iter().collect();
    ordered.sort_by_key(|slab| (slab.position, slab.min_unit));

    if let Some(slab) = ordered
        .iter()
        .find(|slab| slab.max_unit.is_some_and(|max_unit| max_unit < slab.min_unit))
    {
        return Err(BillingError::SlabLoadFailure(format!(
            "slab {}-{:?} has inverted bounds",
            slab.min_unit, slab.max_unit
        )));
    }

    let mut remaining = units;
    let mut energy_charge = Decimal::ZERO;
    let mut slab_wise = Vec::new();

    for slab in ordered {
        if remaining <= Decimal::ZERO {
            break;
        }
        let units_in_slab = match slab.capacity() {
            Some(capacity) => remaining.min(capacity),
            None => remaining,
        };
        if units_in_slab.is_zero() {
            continue;
        }
        let rate = slab.rate_rupees();
        let amount = checked(units_in_slab.checked_mul(rate))?;
        energy_charge = checked(energy_charge.checked_add(amount))?;
        remaining -= units_in_slab;

        slab_wise.push(SlabCharge {
            min_unit: slab.min_unit,
            max_unit: slab.max_unit,
            units: units_in_slab,
            rate: round_money(rate),
            amount: round_money(amount),
        });
    }

    if remaining > Decimal::ZERO {
        return Err(BillingError::SlabLoadFailure(format!(
            "slabs do not cover {} units, top slab must be unbounded",
            units
        )));
    }

    Ok((energy_charge, slab_wise))
}

fn percent_of(amount: Decimal, percent: Decimal) -> Result<Decimal, BillingError> {
    checked(
        amount
            .checked_mul(percent)
            .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED)),
    )
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
