//! Greeting helper.

/// Input for [`greet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Greeting {
    pub name: String,
    pub enthusiastic: bool,
}

pub fn greet(greeting: &Greeting) -> String {
    let suffix = if greeting.enthusiastic { "!" } else { "" };
    format!("Hello, {}{suffix}", greeting.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_greeting_has_no_exclamation() {
        let greeting = Greeting {
            name: "World".to_string(),
            enthusiastic: false,
        };
        assert_eq!(greet(&greeting), "Hello, World");
    }

    #[test]
    fn enthusiastic_greeting() {
        let greeting = Greeting {
            name: "World".to_string(),
            enthusiastic: true,
        };
        assert_eq!(greet(&greeting), "Hello, World!");
    }
}
