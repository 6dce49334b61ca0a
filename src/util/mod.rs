use crate::plan::PlanRef;

pub fn pretty_plan_tree_string(plan: &PlanRef) -> String {
    let mut explain_result = String::new();
    _ = plan.explain(0, &mut explain_result);
    explain_result
}

pub fn pretty_plan_tree(plan: &PlanRef) {
    println!("{}", pretty_plan_tree_string(plan));
}
