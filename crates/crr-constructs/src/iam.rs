//! IAM roles, policies and policy statements

use serde_json::{json, Map, Value};
use tracing::debug;

use crr_core::{ConstructPath, PseudoParameter, Resource, Result, Stack, Token};

/// IAM policy language version
pub const POLICY_VERSION: &str = "2012-10-17";

/// The principal of a statement in a resource or trust policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// An AWS account or role ARN
    Aws(Token),
    /// A service such as `s3.amazonaws.com`
    Service(String),
}

impl Principal {
    /// The root user of an account, i.e. every identity in it
    pub fn account_root(account: &str) -> Self {
        let account = if account.is_empty() {
            Token::Pseudo(PseudoParameter::AccountId)
        } else {
            Token::literal(account)
        };
        Principal::Aws(Token::concat(vec![
            Token::literal("arn:"),
            Token::Pseudo(PseudoParameter::Partition),
            Token::literal(":iam::"),
            account,
            Token::literal(":root"),
        ]))
    }

    pub fn service(name: impl Into<String>) -> Self {
        Principal::Service(name.into())
    }

    fn key(&self) -> &'static str {
        match self {
            Principal::Aws(_) => "AWS",
            Principal::Service(_) => "Service",
        }
    }

    fn value(&self) -> Value {
        match self {
            Principal::Aws(token) => token.to_json(),
            Principal::Service(name) => Value::String(name.clone()),
        }
    }
}

/// A single `Allow` policy statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    pub actions: Vec<String>,
    pub resources: Vec<Token>,
    pub principals: Vec<Principal>,
}

impl PolicyStatement {
    /// An `Allow` statement with no actions or resources
    pub fn allow() -> Self {
        Self {
            actions: Vec::new(),
            resources: Vec::new(),
            principals: Vec::new(),
        }
    }

    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn with_resource(mut self, resource: impl Into<Token>) -> Self {
        self.resources.push(resource.into());
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principals.push(principal);
        self
    }

    /// Render the statement; single-element lists collapse to scalars
    pub fn to_json(&self) -> Value {
        let mut statement = Map::new();
        statement.insert(
            "Action".to_string(),
            collapse(self.actions.iter().map(|a| Value::String(a.clone())).collect()),
        );
        statement.insert("Effect".to_string(), Value::String("Allow".to_string()));

        if !self.principals.is_empty() {
            let mut principals = Map::new();
            for principal in &self.principals {
                let entry = principals
                    .entry(principal.key())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(values) = entry {
                    values.push(principal.value());
                }
            }
            for value in principals.values_mut() {
                *value = match std::mem::take(value) {
                    Value::Array(values) => collapse(values),
                    other => other,
                };
            }
            statement.insert("Principal".to_string(), Value::Object(principals));
        }

        if !self.resources.is_empty() {
            statement.insert(
                "Resource".to_string(),
                collapse(self.resources.iter().map(Token::to_json).collect()),
            );
        }

        Value::Object(statement)
    }
}

fn collapse(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

/// An ordered list of statements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDocument {
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        Self { statements }
    }

    pub fn to_json(&self) -> Value {
        let statements: Vec<Value> = self.statements.iter().map(PolicyStatement::to_json).collect();
        json!({ "Statement": statements, "Version": POLICY_VERSION })
    }
}

/// An `AWS::IAM::Policy` attached to one or more roles
///
/// The statement list is re-rendered into the template after each addition,
/// so statements keep the order they were added in.
#[derive(Debug, Clone)]
pub struct Policy {
    logical_id: String,
    document: PolicyDocument,
}

impl Policy {
    pub fn new(
        stack: &mut Stack,
        scope: &ConstructPath,
        id: &str,
        roles: Vec<Token>,
        statements: Vec<PolicyStatement>,
    ) -> Result<Self> {
        let path = scope.child(id).child("Resource");
        let logical_id = path.logical_id();
        let document = PolicyDocument::new(statements);
        let resource = Resource::new("AWS::IAM::Policy")
            .with_property("PolicyDocument", document.to_json())
            .with_property("PolicyName", logical_id.as_str())
            .with_property("Roles", roles);
        stack.add_resource(&path, resource)?;
        Ok(Self {
            logical_id,
            document,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn document(&self) -> &PolicyDocument {
        &self.document
    }

    /// Append a statement and rewrite the policy document
    pub fn add_statement(&mut self, stack: &mut Stack, statement: PolicyStatement) -> Result<()> {
        self.document.statements.push(statement);
        stack
            .resource_mut(&self.logical_id)?
            .set_property("PolicyDocument", self.document.to_json());
        Ok(())
    }
}

/// Options for [`Role::new`]
#[derive(Debug, Clone)]
pub struct RoleProps {
    pub assumed_by: Principal,
    pub path: Option<String>,
    pub managed_policy_arns: Vec<Token>,
}

impl RoleProps {
    pub fn assumed_by(principal: Principal) -> Self {
        Self {
            assumed_by: principal,
            path: None,
            managed_policy_arns: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_managed_policy(mut self, arn: Token) -> Self {
        self.managed_policy_arns.push(arn);
        self
    }
}

/// An `AWS::IAM::Role`
#[derive(Debug, Clone)]
pub struct Role {
    path: ConstructPath,
    logical_id: String,
    default_policy: Option<Policy>,
}

impl Role {
    pub fn new(stack: &mut Stack, scope: &ConstructPath, id: &str, props: RoleProps) -> Result<Self> {
        let path = scope.child(id);
        let trust = PolicyDocument::new(vec![PolicyStatement::allow()
            .with_actions(["sts:AssumeRole"])
            .with_principal(props.assumed_by)]);

        let mut resource =
            Resource::new("AWS::IAM::Role").with_property("AssumeRolePolicyDocument", trust.to_json());
        if !props.managed_policy_arns.is_empty() {
            resource.set_property("ManagedPolicyArns", props.managed_policy_arns.clone());
        }
        if let Some(role_path) = &props.path {
            resource.set_property("Path", role_path.as_str());
        }

        let logical_id = stack.add_resource(&path.child("Resource"), resource)?;
        Ok(Self {
            path,
            logical_id,
            default_policy: None,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// `Fn::GetAtt [role, Arn]`
    pub fn role_arn(&self) -> Token {
        Token::get_att(&self.logical_id, "Arn")
    }

    /// `Ref role`, which resolves to the role name
    pub fn role_name(&self) -> Token {
        Token::reference(&self.logical_id)
    }

    /// The role's inline policy, once a statement has been added
    pub fn default_policy(&self) -> Option<&Policy> {
        self.default_policy.as_ref()
    }

    /// Add a statement to the role's default policy, creating it on first use
    pub fn add_to_policy(&mut self, stack: &mut Stack, statement: PolicyStatement) -> Result<()> {
        match &mut self.default_policy {
            Some(policy) => policy.add_statement(stack, statement)?,
            None => {
                let policy = Policy::new(
                    stack,
                    &self.path,
                    "DefaultPolicy",
                    vec![self.role_name()],
                    vec![statement],
                )?;
                debug!("{}: created {}", self.logical_id, policy.logical_id());
                self.default_policy = Some(policy);
            }
        }
        Ok(())
    }
}
