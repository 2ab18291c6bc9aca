//! Shared form fields for creating and editing transactions.

use maud::{Markup, html};

use crate::html::{
    FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
    FORM_TEXT_INPUT_STYLE,
};

use super::core::TransactionKind;

/// The values the form fields are rendered with.
///
/// Empty defaults render a blank form; populated defaults preserve what the
/// user typed (after an ignored submit) or what is stored (on the edit
/// screen).
pub struct TransactionFormValues<'a> {
    pub kind: TransactionKind,
    pub amount: Option<f64>,
    pub category: &'a str,
    pub description: &'a str,
}

impl Default for TransactionFormValues<'_> {
    fn default() -> Self {
        Self {
            kind: TransactionKind::Expense,
            amount: None,
            category: "",
            description: "",
        }
    }
}

pub fn transaction_form_fields(values: &TransactionFormValues<'_>) -> Markup {
    let is_expense = matches!(values.kind, TransactionKind::Expense);
    let amount_str = values.amount.map(|amount| format!("{:.2}", amount.abs()));

    html! {
        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="e.g., Groceries"
                required
                value=(values.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0.01"
                    placeholder="e.g., 50.00"
                    required
                    value=[amount_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="category"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            input
                name="category"
                id="category"
                type="text"
                placeholder="e.g., Food"
                required
                value=(values.category)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        fieldset
        {
            legend class=(FORM_LABEL_STYLE) { "Type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-2"
                {
                    input
                        name="type"
                        id="transaction-type-expense"
                        type="radio"
                        value="expense"
                        checked[is_expense]
                        required
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-2"
                {
                    input
                        name="type"
                        id="transaction-type-income"
                        type="radio"
                        value="income"
                        checked[!is_expense]
                        required
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod form_field_tests {
    use scraper::{Html, Selector};

    use crate::transaction::core::TransactionKind;

    use super::{TransactionFormValues, transaction_form_fields};

    #[test]
    fn renders_all_required_inputs() {
        let markup = transaction_form_fields(&TransactionFormValues::default());
        let document = Html::parse_fragment(&markup.into_string());

        for (name, type_) in [
            ("description", "text"),
            ("amount", "number"),
            ("category", "text"),
        ] {
            let selector =
                Selector::parse(&format!("input[name={name}][type={type_}][required]")).unwrap();
            assert_eq!(
                document.select(&selector).count(),
                1,
                "want exactly one required {name} input"
            );
        }

        let radio_selector = Selector::parse("input[type=radio][name=type]").unwrap();
        assert_eq!(document.select(&radio_selector).count(), 2);
    }

    #[test]
    fn expense_is_checked_by_default() {
        let markup = transaction_form_fields(&TransactionFormValues::default());
        let document = Html::parse_fragment(&markup.into_string());

        let checked = Selector::parse("input[type=radio][checked]").unwrap();
        let checked_values: Vec<_> = document
            .select(&checked)
            .filter_map(|input| input.value().attr("value"))
            .collect();

        assert_eq!(checked_values, ["expense"]);
    }

    #[test]
    fn preserves_existing_values() {
        let values = TransactionFormValues {
            kind: TransactionKind::Income,
            amount: Some(1250.0),
            category: "Salary",
            description: "pay day",
        };

        let markup = transaction_form_fields(&values).into_string();

        assert!(markup.contains("1250.00"));
        assert!(markup.contains("Salary"));
        assert!(markup.contains("pay day"));
    }
}
