/// Declares an enum that (de)serializes as the Gemini wire strings.
///
/// Unknown strings deserialize to the fallback variant instead of failing,
/// so new values added by the API do not break response parsing.
///
/// ```ignore
/// wire_enum! {
///     pub enum FinishReason {
///         Stop => "STOP",
///         Other => "OTHER",
///     }
///     fallback: Other
/// }
/// ```
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $Name:ident {
            $(
                $(#[$vmeta:meta])*
                $Variant:ident => $wire:literal
            ),+ $(,)?
        }
        fallback: $Fallback:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $Name {
            $(
                $(#[$vmeta])*
                $Variant,
            )+
        }

        impl $Name {
            pub fn as_wire_str(self) -> &'static str {
                match self {
                    $( Self::$Variant => $wire, )+
                }
            }

            pub fn from_wire_str(value: &str) -> Self {
                match value {
                    $( $wire => Self::$Variant, )+
                    _ => Self::$Fallback,
                }
            }
        }

        impl ::serde::Serialize for $Name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(self.as_wire_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let value = String::deserialize(deserializer)?;
                Ok(Self::from_wire_str(&value))
            }
        }
    };
}
