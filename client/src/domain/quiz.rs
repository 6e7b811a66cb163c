//! Shisha flavour quiz: three answers in, one package and flavour list out.

use std::fmt;
use std::str::FromStr;

use super::order::{OrderForm, OrderType};
use super::validation::FormValidationError;

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`", $label, "`")]
                $variant
            ),+
        }

        impl $name {
            /// Every choice, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Lower-case label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = FormValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.as_str().eq_ignore_ascii_case(value.trim()))
                    .ok_or_else(|| FormValidationError::UnknownOption {
                        field: $field,
                        value: value.to_owned(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    /// How strong the smoke should be.
    Intensity, "intensity" { Soft => "soft", Medium => "medium", Intense => "intense" }
}

choice_enum! {
    /// Preferred flavour family.
    FlavorFamily, "flavour family" { Fruity => "fruity", Fresh => "fresh", Sweet => "sweet", Spiced => "spiced" }
}

choice_enum! {
    /// What the visit is for.
    Occasion, "occasion" { Casual => "casual", Group => "group", Special => "special" }
}

/// Completed quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizAnswers {
    /// Preferred smoke strength.
    pub intensity: Intensity,
    /// Preferred flavour family.
    pub flavor_family: FlavorFamily,
    /// What the visit is for.
    pub occasion: Occasion,
}

/// Suggested package and flavours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRecommendation {
    /// Suggested package.
    pub order_type: OrderType,
    /// Suggested flavours: one for classic, two for traditional, three for premium.
    pub flavors: Vec<&'static str>,
}

impl QuizAnswers {
    /// Map answers to a package: premium for intense smoke or special
    /// occasions, traditional for medium smoke, classic otherwise.
    pub fn recommend(&self) -> QuizRecommendation {
        let order_type = match (self.intensity, self.occasion) {
            (Intensity::Intense, _) | (_, Occasion::Special) => OrderType::Premium,
            (Intensity::Medium, _) => OrderType::Traditional,
            _ => OrderType::Classic,
        };
        let pool = flavors_for(self.flavor_family);
        let count = match order_type {
            OrderType::Classic => 1,
            OrderType::Traditional => 2,
            OrderType::Premium => 3,
        };
        QuizRecommendation {
            order_type,
            flavors: pool.iter().copied().take(count).collect(),
        }
    }
}

impl QuizRecommendation {
    /// Order form preset to the recommended package, with the flavours
    /// noted in the observations.
    pub fn prefill(&self) -> OrderForm {
        OrderForm {
            observations: Some(format!("Sabores: {}", self.flavors.join(", "))),
            ..OrderForm::for_type(self.order_type)
        }
    }
}

fn flavors_for(family: FlavorFamily) -> &'static [&'static str] {
    match family {
        FlavorFamily::Fruity => &["Uva", "Sandía", "Frutos rojos"],
        FlavorFamily::Fresh => &["Menta", "Lima-limón", "Hielo azul"],
        FlavorFamily::Sweet => &["Chicle", "Vainilla", "Caramelo"],
        FlavorFamily::Spiced => &["Chai", "Canela", "Cardamomo"],
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Intensity::Intense, Occasion::Casual, OrderType::Premium)]
    #[case(Intensity::Soft, Occasion::Special, OrderType::Premium)]
    #[case(Intensity::Medium, Occasion::Group, OrderType::Traditional)]
    #[case(Intensity::Soft, Occasion::Casual, OrderType::Classic)]
    #[case(Intensity::Soft, Occasion::Group, OrderType::Classic)]
    fn packages(#[case] intensity: Intensity, #[case] occasion: Occasion, #[case] expected: OrderType) {
        let answers = QuizAnswers {
            intensity,
            flavor_family: FlavorFamily::Fresh,
            occasion,
        };
        assert_eq!(answers.recommend().order_type, expected);
    }

    #[rstest]
    fn recommendation_prefills_order_form() {
        let recommendation = QuizAnswers {
            intensity: Intensity::Medium,
            flavor_family: FlavorFamily::Fruity,
            occasion: Occasion::Casual,
        }
        .recommend();

        assert_eq!(recommendation.flavors, ["Uva", "Sandía"]);
        let form = recommendation.prefill();
        assert_eq!(form.order_type, OrderType::Traditional);
        assert_eq!(form.quantity, 1);
        assert_eq!(form.observations.as_deref(), Some("Sabores: Uva, Sandía"));
    }

    #[rstest]
    fn parses_answers_case_insensitively() {
        assert_eq!("INTENSE".parse::<Intensity>(), Ok(Intensity::Intense));
        assert_eq!(
            "bitter".parse::<FlavorFamily>(),
            Err(FormValidationError::UnknownOption {
                field: "flavour family",
                value: "bitter".to_owned()
            })
        );
    }
}
