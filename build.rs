use std::path::Path;

const REQUIRED_DICTIONARIES: [&str; 4] = ["specialties", "procedures", "conditions", "anatomy"];

fn main() {
    let vocabulary_path = Path::new("data/vocabulary.json");
    validate_vocabulary_file(vocabulary_path);
    set_build_dependencies();
}

fn validate_vocabulary_file(vocabulary_path: &Path) {
    // Ensure vocabulary exists at build time
    assert!(
        vocabulary_path.exists(),
        "\n\nVOCABULARY BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the vocabulary file before building.\n",
        vocabulary_path.display()
    );

    let contents = std::fs::read_to_string(vocabulary_path).unwrap_or_else(|e| {
        panic!(
            "\n\nVOCABULARY BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            vocabulary_path.display()
        );
    });

    let vocabulary: serde_json::Value = serde_json::from_str(&contents).unwrap_or_else(|e| {
        panic!(
            "\n\nVOCABULARY BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            vocabulary_path.display()
        );
    });

    validate_vocabulary_structure(&vocabulary);
}

fn validate_vocabulary_structure(vocabulary: &serde_json::Value) {
    assert!(
        vocabulary.is_object(),
        "\n\nVOCABULARY BUILD ERROR: Root must be a JSON object\n"
    );

    let abbreviations = string_table(vocabulary, "abbreviations");
    string_table(vocabulary, "full_replacements");

    let misspellings = vocabulary.get("misspellings").unwrap_or_else(|| {
        panic!("\n\nVOCABULARY BUILD ERROR: Missing 'misspellings' field\n");
    });
    let mut corrections = 0;
    for name in REQUIRED_DICTIONARIES {
        corrections += string_table(misspellings, name);
    }

    let rules = validate_category_rules(vocabulary);

    println!(
        "cargo:warning=Validated vocabulary: {abbreviations} abbreviations, {corrections} corrections, {rules} category rules"
    );
}

/// Check that `field` is an object whose values are all strings; returns its size.
fn string_table(parent: &serde_json::Value, field: &str) -> usize {
    let table = parent
        .get(field)
        .and_then(|v| v.as_object())
        .unwrap_or_else(|| {
            panic!(
                "\n\nVOCABULARY BUILD ERROR: '{field}' must be an object of string values\n"
            );
        });

    for (key, value) in table {
        assert!(
            value.is_string(),
            "\n\nVOCABULARY BUILD ERROR: '{field}' entry '{key}' is not a string\n"
        );
    }

    table.len()
}

fn validate_category_rules(vocabulary: &serde_json::Value) -> usize {
    let rules = vocabulary
        .get("category_rules")
        .and_then(|r| r.as_array())
        .unwrap_or_else(|| {
            panic!("\n\nVOCABULARY BUILD ERROR: 'category_rules' must be an array\n");
        });

    for (i, rule) in rules.iter().enumerate() {
        let tag = rule.get("tag").and_then(|v| v.as_str()).unwrap_or("");
        assert!(
            !tag.is_empty(),
            "\n\nVOCABULARY BUILD ERROR: Category rule {i} missing 'tag'\n"
        );

        let pattern = rule.get("pattern").and_then(|v| v.as_str()).unwrap_or("");
        assert!(
            !pattern.is_empty(),
            "\n\nVOCABULARY BUILD ERROR: Category rule '{tag}' (index {i}) has an empty pattern\n"
        );
    }

    rules.len()
}

fn set_build_dependencies() {
    println!("cargo:rerun-if-changed=data/vocabulary.json");
    println!("cargo:rerun-if-changed=build.rs");
}
