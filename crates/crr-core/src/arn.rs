//! ARN construction
//!
//! ARNs are assembled from explicit components; nothing falls back to the
//! current stack's region or account implicitly. The partition is left to the
//! `AWS::Partition` pseudo parameter unless rendered with a concrete one.

use serde::{Deserialize, Serialize};

use crate::token::{PseudoParameter, Token};

/// How the resource type and resource name are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArnFormat {
    /// `resource/resource-name`
    #[default]
    SlashResourceName,
    /// `resource` only (S3 buckets, where the resource is the bucket name)
    NoResourceName,
}

/// The components of an ARN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArnComponents {
    pub service: String,
    pub region: String,
    pub account: String,
    pub resource: String,
    pub resource_name: Option<String>,
    #[serde(default)]
    pub format: ArnFormat,
}

impl ArnComponents {
    /// ARN of an SSM parameter in a specific region and account
    pub fn ssm_parameter(region: &str, account: &str, parameter_name: &str) -> Self {
        Self {
            service: "ssm".to_string(),
            region: region.to_string(),
            account: account.to_string(),
            resource: "parameter".to_string(),
            resource_name: Some(parameter_name.to_string()),
            format: ArnFormat::SlashResourceName,
        }
    }

    /// ARN of an S3 bucket (S3 ARNs carry neither region nor account)
    pub fn s3_bucket(bucket_name: &str) -> Self {
        Self {
            service: "s3".to_string(),
            region: String::new(),
            account: String::new(),
            resource: bucket_name.to_string(),
            resource_name: None,
            format: ArnFormat::NoResourceName,
        }
    }

    /// Everything after `arn:<partition>:`
    fn suffix(&self) -> String {
        let resource = match (&self.resource_name, self.format) {
            (None, _) | (_, ArnFormat::NoResourceName) => self.resource.clone(),
            (Some(name), ArnFormat::SlashResourceName) => {
                // SSM-style hierarchical names already start with '/'
                format!("{}/{}", self.resource, name.trim_start_matches('/'))
            }
        };
        format!(
            "{}:{}:{}:{}",
            self.service, self.region, self.account, resource
        )
    }

    /// Partition-relative ARN as a deployment-time token
    pub fn to_token(&self) -> Token {
        Token::concat(vec![
            Token::literal("arn:"),
            Token::Pseudo(PseudoParameter::Partition),
            Token::literal(format!(":{}", self.suffix())),
        ])
    }

    /// ARN rendered for a concrete partition (e.g. "aws")
    pub fn render(&self, partition: &str) -> String {
        format!("arn:{}:{}", partition, self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ssm_parameter_components() {
        let arn = ArnComponents::ssm_parameter("R1", "123456789012", "P");
        assert_eq!(arn.service, "ssm");
        assert_eq!(arn.region, "R1");
        assert_eq!(arn.resource, "parameter");
        assert_eq!(arn.resource_name.as_deref(), Some("P"));
        assert_eq!(arn.render("aws"), "arn:aws:ssm:R1:123456789012:parameter/P");
    }

    #[test]
    fn test_ssm_hierarchical_name_is_not_double_slashed() {
        let arn = ArnComponents::ssm_parameter("eu-west-2", "123456789012", "/app/key");
        assert_eq!(
            arn.render("aws"),
            "arn:aws:ssm:eu-west-2:123456789012:parameter/app/key"
        );
    }

    #[test]
    fn test_s3_bucket_arn() {
        let arn = ArnComponents::s3_bucket("my-bucket");
        assert_eq!(arn.render("aws-cn"), "arn:aws-cn:s3:::my-bucket");
    }

    #[test]
    fn test_to_token_uses_partition_pseudo_parameter() {
        let arn = ArnComponents::ssm_parameter("ap-northeast-2", "554416834557", "Stack.MyTargetKeyId");
        assert_eq!(
            arn.to_token().to_json(),
            json!({ "Fn::Join": ["", [
                "arn:",
                { "Ref": "AWS::Partition" },
                ":ssm:ap-northeast-2:554416834557:parameter/Stack.MyTargetKeyId"
            ]] })
        );
    }
}
