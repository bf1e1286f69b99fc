//! The `classify` command.

use assetloader::ident::{classify, short_name, Origin};

use crate::error::CliError;

/// Print the origin of each identifier.
pub fn run(ids: &[String]) -> Result<(), CliError> {
    for id in ids {
        println!("{}", describe(id));
    }
    Ok(())
}

fn describe(id: &str) -> String {
    let origin = match classify(id) {
        Origin::Workshop(n) => format!("workshop {}", n),
        Origin::Private => "private".to_string(),
        Origin::Legacy => "legacy".to_string(),
    };
    format!("{}\t{}\t{}", id, origin, short_name(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(describe("1234567.Foo_Data"), "1234567.Foo_Data\tworkshop 1234567\tFoo");
        assert_eq!(describe("MyCity.House"), "MyCity.House\tprivate\tHouse");
        assert_eq!(describe("House"), "House\tlegacy\tHouse");
    }
}
