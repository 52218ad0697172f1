//! Placeholder token tables and replacement builders.
//!
//! Tokens are square-bracket-delimited (`[KlantNaam]`), matched
//! case-insensitively as whole tokens, with no escaping or nesting. The
//! token names are the template contract and match the original template
//! documents, hence the Dutch. Repeating item tokens carry a 1-based slot
//! index suffix (`[LoopART_Aantal3]`).

use crate::dtos::{DocumentData, ItemData};
use crate::models::TemplateType;
use crate::services::docstore::Replacement;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Tokens every template shares: customer, document, order, and
/// organization fields.
pub const COMMON_TOKENS: [&str; 24] = [
    "[KlantNaam]",
    "[KlantAdres]",
    "[KlantPostcode]",
    "[KlantPlaats]",
    "[KlantEmail]",
    "[KlantTelefoon]",
    "[ContactPersoon]",
    "[DocumentNummer]",
    "[Datum]",
    "[Omschrijving]",
    "[Notities]",
    "[OpdrachtNummer]",
    "[OpdrachtDatum]",
    "[Status]",
    "[BedrijfNaam]",
    "[BedrijfAdres]",
    "[BedrijfPostcode]",
    "[BedrijfPlaats]",
    "[BedrijfTelefoon]",
    "[BedrijfEmail]",
    "[BedrijfWebsite]",
    "[KvKNummer]",
    "[BTWNummer]",
    "[IBAN]",
];

/// Financial totals tokens.
pub const FINANCIAL_TOKENS: [&str; 3] = ["[SubtotaalExclBTW]", "[TotaalBTW]", "[TotaalInclBTW]"];

/// Stems of the repeating item block; each expands to `[<stem><N>]` for
/// every slot index N up to the configured ceiling.
pub const LOOP_TOKEN_STEMS: [&str; 8] = [
    "LoopART_Aantal",
    "LoopART_Omschrijving",
    "LoopART_Eenheid",
    "LoopART_PrijsExclBTW",
    "LoopART_BTWPercentage",
    "LoopART_TotaalExclBTW",
    "LoopART_TotaalInclBTW",
    "LoopART_Notities",
];

/// Per-template extra tokens.
pub fn template_extra_tokens(template_type: TemplateType) -> &'static [&'static str] {
    match template_type {
        TemplateType::Quote => &["[GeldigTot]", "[OfferteNummer]"],
        TemplateType::Invoice | TemplateType::CombinedInvoice => {
            &["[FactuurNummer]", "[Vervaldatum]", "[BetalingsTermijn]"]
        }
        TemplateType::WorkOrder => &["[WerkbonNummer]", "[Technicus]", "[Uitgevoerd]"],
    }
}

/// Format an amount as currency: two decimals, comma decimal separator,
/// `€` prefix with a single space. Zero renders as `€ 0,00`.
pub fn format_currency(amount: Decimal) -> String {
    format!("€ {:.2}", amount).replace('.', ",")
}

/// Format a tax percentage; whole-number rates drop their fraction
/// (`21.00` renders `21%`).
pub fn format_percentage(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

fn format_quantity(quantity: Option<Decimal>) -> String {
    quantity.map(|q| q.normalize().to_string()).unwrap_or_default()
}

/// Replacements for the common and financial token sets.
pub fn basic_replacements(data: &DocumentData) -> Vec<Replacement> {
    let customer = &data.customer;
    let order = &data.order;
    let totals = &data.totals;
    let organization = &data.organization;

    vec![
        // Customer information
        Replacement::new("[KlantNaam]", &customer.company_name),
        Replacement::new("[KlantAdres]", &customer.street),
        Replacement::new("[KlantPostcode]", &customer.postal_code),
        Replacement::new("[KlantPlaats]", &customer.city),
        Replacement::new("[KlantEmail]", &customer.email),
        Replacement::new("[KlantTelefoon]", &customer.phone),
        Replacement::new("[ContactPersoon]", &customer.contact_person),
        // Document information
        Replacement::new("[DocumentNummer]", &data.document_number),
        Replacement::new("[Datum]", &data.date),
        Replacement::new("[Omschrijving]", &data.description),
        Replacement::new("[Notities]", &data.notes),
        // Order information
        Replacement::new("[OpdrachtNummer]", &order.order_number),
        Replacement::new("[OpdrachtDatum]", &order.order_date),
        Replacement::new("[Status]", &order.status),
        // Financial totals
        Replacement::new("[SubtotaalExclBTW]", format_currency(totals.subtotal_excl_tax)),
        Replacement::new("[TotaalBTW]", format_currency(totals.tax_total)),
        Replacement::new("[TotaalInclBTW]", format_currency(totals.total_incl_tax)),
        // Organization information
        Replacement::new("[BedrijfNaam]", &organization.name),
        Replacement::new("[BedrijfAdres]", &organization.street),
        Replacement::new("[BedrijfPostcode]", &organization.postal_code),
        Replacement::new("[BedrijfPlaats]", &organization.city),
        Replacement::new("[BedrijfTelefoon]", &organization.phone),
        Replacement::new("[BedrijfEmail]", &organization.email),
        Replacement::new("[BedrijfWebsite]", &organization.website),
        Replacement::new("[KvKNummer]", &organization.coc_number),
        Replacement::new("[BTWNummer]", &organization.vat_number),
        Replacement::new("[IBAN]", &organization.iban),
    ]
}

/// Replacements for the per-template extra tokens. The number aliases take
/// the document number; the remaining extras have no counterpart in the
/// data payload and are blanked so no token survives in the artifact.
pub fn extra_replacements(template_type: TemplateType, data: &DocumentData) -> Vec<Replacement> {
    template_extra_tokens(template_type)
        .iter()
        .map(|token| {
            let value = match *token {
                "[OfferteNummer]" | "[FactuurNummer]" | "[WerkbonNummer]" => {
                    data.document_number.clone()
                }
                _ => String::new(),
            };
            Replacement::new(*token, value)
        })
        .collect()
}

/// Replacements for the repeating item block. Items are substituted in
/// list order, up to `max_slots`; items past the ceiling are silently
/// dropped. Every slot index beyond the item count is blanked, so no
/// indexed token remains unresolved however many items were supplied.
pub fn item_replacements(items: &[ItemData], max_slots: usize) -> Vec<Replacement> {
    let mut replacements = Vec::with_capacity(max_slots * LOOP_TOKEN_STEMS.len());

    for (slot, item) in items.iter().take(max_slots).enumerate() {
        let i = slot + 1;
        replacements.extend([
            Replacement::new(format!("[LoopART_Aantal{}]", i), format_quantity(item.quantity)),
            Replacement::new(format!("[LoopART_Omschrijving{}]", i), &item.description),
            Replacement::new(format!("[LoopART_Eenheid{}]", i), &item.unit),
            Replacement::new(
                format!("[LoopART_PrijsExclBTW{}]", i),
                format_currency(item.unit_price_excl_tax),
            ),
            Replacement::new(
                format!("[LoopART_BTWPercentage{}]", i),
                format_percentage(item.tax_percentage),
            ),
            Replacement::new(
                format!("[LoopART_TotaalExclBTW{}]", i),
                format_currency(item.total_excl_tax),
            ),
            Replacement::new(
                format!("[LoopART_TotaalInclBTW{}]", i),
                format_currency(item.total_incl_tax),
            ),
            Replacement::new(format!("[LoopART_Notities{}]", i), &item.delivery_notes),
        ]);
    }

    // Clear unused slots
    for i in (items.len().min(max_slots) + 1)..=max_slots {
        for stem in LOOP_TOKEN_STEMS {
            replacements.push(Replacement::new(format!("[{}{}]", stem, i), ""));
        }
    }

    replacements
}

/// The deduplicated, sorted set of every token a template of this type
/// declares: common fields, the loop block expanded across the slot
/// ceiling, the financial totals, and the per-type extras.
pub fn all_placeholders(template_type: TemplateType, max_slots: usize) -> Vec<String> {
    let mut tokens = BTreeSet::new();

    for token in COMMON_TOKENS {
        tokens.insert(token.to_string());
    }
    for token in FINANCIAL_TOKENS {
        tokens.insert(token.to_string());
    }
    for i in 1..=max_slots {
        for stem in LOOP_TOKEN_STEMS {
            tokens.insert(format!("[{}{}]", stem, i));
        }
    }
    for token in template_extra_tokens(template_type) {
        tokens.insert(token.to_string());
    }

    tokens.into_iter().collect()
}
