//! Fixture SDK library for unit tests.

use std::path::Path;

pub(crate) const CORE_SOURCE: &str = "\
// runtime entry
var AWS = require('./core');
window.AWS = AWS;
module.exports = AWS;";

/// `(service, class, versions)` of the fixture catalog.
pub(crate) const SERVICES: &[(&str, &str, &[&str])] = &[
    ("dynamodb", "DynamoDB", &["2011-12-05-preview", "2012-08-10"]),
    ("s3", "S3", &["2006-03-01"]),
    ("sns", "SNS", &["2010-03-31"]),
    ("sqs", "SQS", &["2012-11-05"]),
    ("sts", "STS", &["2011-06-15"]),
];

pub(crate) fn header_source(service: &str, class: &str) -> String {
    format!(
        "var AWS = require('../core');\n\
         \n\
         /**\n \
         * Copyright 2012-2013 Amazon.com, Inc. or its affiliates.\n \
         */\n\
         AWS.{class} = AWS.Service.defineService('{service}');\n\
         // customizations follow\n\
         AWS.util.update(AWS.{class}.prototype, {{}});\n\
         module.exports = AWS.{class};"
    )
}

/// Write the fixture library under `root`.
pub(crate) fn write_fixture_library(root: &Path) {
    let services = root.join("lib").join("services");
    let apis = root.join("apis");
    std::fs::create_dir_all(&services).unwrap();
    std::fs::create_dir_all(&apis).unwrap();

    std::fs::write(root.join("package.json"), r#"{"name":"aws-sdk","version":"2.0.0"}"#).unwrap();
    std::fs::write(root.join("lib").join("browser.js"), CORE_SOURCE).unwrap();

    for (service, class, versions) in SERVICES {
        std::fs::write(services.join(format!("{service}.js")), header_source(service, class)).unwrap();
        for version in *versions {
            let doc = format!(
                r#"{{"metadata":{{"apiVersion":"{version}","serviceAbbreviation":"Amazon {class}"}},"operations":{{}}}}"#
            );
            std::fs::write(apis.join(format!("{service}-{version}.json")), doc).unwrap();
        }
    }

    // Companion files the catalog must ignore
    std::fs::write(apis.join("s3-2006-03-01.paginators.json"), "{}").unwrap();
    std::fs::write(apis.join("metadata.json"), "{}").unwrap();
}
