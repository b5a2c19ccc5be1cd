//! Cross-account pull-policy visitors: detection, policy sharing, and the
//! late-role flush for batch job definitions.

use std::rc::Rc;

use berth_aspect::{
    BatchJobDefinition, CompositeAspect, ContainerDefinition, ResourceNode, Role, TaskDefinition,
    TrainingJob,
};
use berth_core::config::ENV_IMAGE_ASSET_ACCOUNT_ID;
use berth_core::expr::Expr;

const IMAGE_ACCOUNT: &str = "999999999999";

fn remote_image(repo: &str) -> Expr {
    Expr::from_template(format!(
        "{IMAGE_ACCOUNT}.dkr.ecr.${{AWS::Region}}.${{AWS::URLSuffix}}/{repo}:abcdef"
    ))
}

fn task_node(repo: &str, role: &Rc<Role>) -> ResourceNode {
    ResourceNode::TaskDefinition(TaskDefinition {
        containers: vec![ContainerDefinition { image: remote_image(repo) }],
        execution_role: Rc::clone(role),
    })
}

#[test]
fn same_repository_yields_reference_identical_policies() {
    let mut aspect = CompositeAspect::new(IMAGE_ACCOUNT);

    let role_a = Role::new("arn:aws:iam::111:role/a");
    let role_b = Role::new("arn:aws:iam::111:role/b");
    aspect.visit(&task_node("shared-repo", &role_a));
    aspect.visit(&task_node("shared-repo", &role_b));

    let pa = role_a.policies();
    let pb = role_b.policies();
    assert_eq!(pa.len(), 1);
    assert_eq!(pb.len(), 1);
    assert!(Rc::ptr_eq(&pa[0], &pb[0]));
    assert_eq!(aspect.policy_count(), 1);
}

#[test]
fn policy_scopes_to_repository_in_image_account() {
    let mut aspect = CompositeAspect::new(IMAGE_ACCOUNT);
    let role = Role::new("arn:aws:iam::111:role/task");
    aspect.visit(&task_node("my-repo", &role));

    let policies = role.policies();
    assert_eq!(policies[0].repository_name, "my-repo");
    let stmt = &policies[0].statements[0];
    assert_eq!(stmt.actions.len(), 3);
    assert_eq!(
        stmt.resources,
        vec![format!(
            "arn:${{AWS::Partition}}:ecr:${{AWS::Region}}:{IMAGE_ACCOUNT}:repository/my-repo"
        )]
    );
}

#[test]
fn policy_serializes_as_a_statement_document() {
    let mut aspect = CompositeAspect::new(IMAGE_ACCOUNT);
    let role = Role::new("arn:aws:iam::111:role/task");
    aspect.visit(&task_node("my-repo", &role));

    let doc = serde_json::to_value(&*role.policies()[0]).unwrap();
    assert_eq!(doc["repositoryName"], "my-repo");
    assert_eq!(
        doc["statements"][0]["actions"],
        serde_json::json!([
            "ecr:BatchCheckLayerAvailability",
            "ecr:GetDownloadUrlForLayer",
            "ecr:BatchGetImage",
        ])
    );
    assert_eq!(
        doc["statements"][0]["resources"][0],
        format!("arn:${{AWS::Partition}}:ecr:${{AWS::Region}}:{IMAGE_ACCOUNT}:repository/my-repo")
    );
}

#[test]
fn same_account_images_are_ignored() {
    let mut aspect = CompositeAspect::new(IMAGE_ACCOUNT);
    let role = Role::new("arn:aws:iam::111:role/task");

    let node = ResourceNode::TaskDefinition(TaskDefinition {
        containers: vec![ContainerDefinition {
            image: Expr::from_template(
                "111122223333.dkr.ecr.${AWS::Region}.${AWS::URLSuffix}/own-repo:abcdef",
            ),
        }],
        execution_role: Rc::clone(&role),
    });
    aspect.visit(&node);
    assert!(role.policies().is_empty());
}

#[test]
fn training_job_role_gets_policy() {
    let mut aspect = CompositeAspect::new(IMAGE_ACCOUNT);
    let role = Role::new("arn:aws:iam::111:role/train");
    aspect.visit(&ResourceNode::TrainingJob(TrainingJob {
        training_image: remote_image("train-repo"),
        role: Rc::clone(&role),
    }));
    assert_eq!(role.policies().len(), 1);
}

#[test]
fn batch_job_flushes_onto_role_observed_later() {
    let mut aspect = CompositeAspect::new(IMAGE_ACCOUNT);
    let arn = "arn:aws:iam::111:role/batch-exec";

    // Job definition first; its role has not been visited yet.
    aspect.visit(&ResourceNode::BatchJobDefinition(BatchJobDefinition {
        image: remote_image("batch-repo"),
        execution_role_arn: Some(arn.to_string()),
    }));
    // Duplicate reference queues only once.
    aspect.visit(&ResourceNode::BatchJobDefinition(BatchJobDefinition {
        image: remote_image("batch-repo"),
        execution_role_arn: Some(arn.to_string()),
    }));

    let role = Role::new(arn);
    aspect.visit(&ResourceNode::Role(Rc::clone(&role)));
    assert_eq!(role.policies().len(), 1);
    assert_eq!(role.policies()[0].repository_name, "batch-repo");
}

#[test]
fn batch_job_attaches_directly_when_role_already_known() {
    let mut aspect = CompositeAspect::new(IMAGE_ACCOUNT);
    let arn = "arn:aws:iam::111:role/batch-exec";
    let role = Role::new(arn);

    aspect.visit(&ResourceNode::Role(Rc::clone(&role)));
    aspect.visit(&ResourceNode::BatchJobDefinition(BatchJobDefinition {
        image: remote_image("batch-repo"),
        execution_role_arn: Some(arn.to_string()),
    }));
    assert_eq!(role.policies().len(), 1);
}

// Both branches in one test: the variable is process-global state and the
// harness runs tests in parallel.
#[test]
fn from_env_requires_the_account_variable() {
    std::env::remove_var(ENV_IMAGE_ASSET_ACCOUNT_ID);
    assert!(CompositeAspect::from_env().is_err());

    std::env::set_var(ENV_IMAGE_ASSET_ACCOUNT_ID, IMAGE_ACCOUNT);
    let mut aspect = CompositeAspect::from_env().unwrap();
    let role = Role::new("arn:aws:iam::111:role/task");
    aspect.visit(&task_node("env-repo", &role));
    assert_eq!(role.policies().len(), 1);
    std::env::remove_var(ENV_IMAGE_ASSET_ACCOUNT_ID);
}

#[test]
fn unmatched_nodes_are_tolerated() {
    let mut aspect = CompositeAspect::new(IMAGE_ACCOUNT);
    aspect.visit(&ResourceNode::Other);
    aspect.visit(&ResourceNode::BatchJobDefinition(BatchJobDefinition {
        image: Expr::from_template("not-an-ecr-uri"),
        execution_role_arn: None,
    }));
    assert_eq!(aspect.policy_count(), 0);
}
