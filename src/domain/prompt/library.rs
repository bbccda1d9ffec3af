//! Built-in prompt templates for plan generation, evaluation and test-set generation

use super::registry::TemplateRegistry;
use super::template::TemplateError;

pub const ANALYSIS_TEMPLATE: &str = "safety_plan.analysis";
pub const SYNTHESIS_TEMPLATE: &str = "safety_plan.synthesis";
pub const FAITHFULNESS_TEMPLATE: &str = "evaluation.faithfulness";
pub const ANSWER_RELEVANCY_TEMPLATE: &str = "evaluation.answer_relevancy";
pub const CONTEXT_PRECISION_TEMPLATE: &str = "evaluation.context_precision";
pub const CONTEXT_RECALL_TEMPLATE: &str = "evaluation.context_recall";
pub const TEST_SET_SEED_TEMPLATE: &str = "test_set.seed_query";
pub const TEST_SET_STRUCTURE_TEMPLATE: &str = "test_set.structure";
pub const TEST_SET_GROUND_TRUTH_TEMPLATE: &str = "test_set.ground_truth";

const ANALYSIS: &str = r#"You are a City of Toronto safety advisor specializing in crime prevention and public safety in Toronto, Ontario.

Your task is to provide a relevant, factual and meaningful analysis based on the user's request and the relevant resources.

USER REQUEST:
${var:input}

RELEVANT TORONTO POLICE, CITY OF TORONTO, AND GOVERNMENT RESOURCES:
${var:context}

Please brainstorm, think through this information, and provide a detailed analysis considering only the information provided above.

In your analysis:
- Be specific and refer only to the information provided in the input and context.
- If the input or context doesn't provide sufficient information for any point, clearly state this lack of information.
- If you use information from the context, cite the source.

Refrain from providing legal, medical, financial or personal or professional advice, stay within the scope of a safety plan and a role as a safety advisor."#;

const SYNTHESIS: &str = r#"You are a City of Toronto safety advisor specializing in crime prevention and public safety in Toronto, Ontario.

Your goal is to synthesize the provided analysis into an actionable, tailored safety plan that supports the user's safety concerns and enhances their safety, in the City of Toronto. Your tone should be respectful and professional.

You are provided the following information regarding the user:
${var:input}

I have conducted the following analysis regarding the user's request and the relevant resources:

<analysis>
${var:analysis}
</analysis>

Based on the provided information, create a detailed safety plan that includes:

1. NEIGHBOURHOOD-SPECIFIC ASSESSMENT:
- Current safety landscape of the specified neighbourhood
- Known risk factors and patterns
- Specific areas or times that require extra caution

2. TARGETED SAFETY RECOMMENDATIONS:
For each crime concern mentioned:
- Specific prevention strategies
- Warning signs to watch for
- Immediate actions to take if encountered
- Available community resources

3. PERSONAL SAFETY PROTOCOL:
- Daily safety habits to develop
- Essential safety tools or resources to have
- Emergency contact information and procedures
- Community support services available

4. PREVENTIVE MEASURES:
- Home/property security recommendations
- Personal safety technology suggestions
- Community engagement opportunities
- Reporting procedures and important contacts

Guidelines for your response:
- Provide specific, actionable advice that can be implemented immediately
- Include both preventive measures and emergency response protocols
- Reference relevant Toronto Police Service programs or initiatives when applicable
- Maintain a supportive and empowering tone while being clear about risks
- Prioritize recommendations based on the specific crime patterns
- Include relevant contact numbers and resources
- Use the four section headings exactly as written above, in that order, once each

Here is an example of a well-formed safety plan. Match its structure, not its content:

<example>
${var:example_plan}
</example>

If certain information is not available in the knowledge base, acknowledge this and provide general best practices, while encouraging the user to contact Toronto Police Service's non-emergency line for more specific guidance.

Refrain from providing legal, medical, financial or personal or professional advice, stay within the scope of a safety plan and a role as a safety advisor.

Remember: Focus on prevention and awareness without causing undue alarm. Empower the user with knowledge and practical steps they can take to enhance their safety."#;

/// Few-shot exemplar of the four-section plan format
pub const EXAMPLE_SAFETY_PLAN: &str = r#"1. NEIGHBOURHOOD-SPECIFIC ASSESSMENT:

Agincourt North is generally a safe neighbourhood with low levels of assault and break and enter incidents. However, there are medium levels of auto theft and robbery. It's important to be vigilant, especially during late hours and in less crowded areas. Parking lots and streets with less foot traffic may be hotspots for auto theft.

2. TARGETED SAFETY RECOMMENDATIONS:

- Assault and Break and Enter: Although these crimes are low in your area, it's important to stay vigilant. Keep your home well-lit, especially around entrances and exits. Install a peephole or doorbell camera to monitor who approaches your home. If you notice any suspicious activity, report it to the police immediately.

- Auto Theft and Robbery: Always lock your car doors and keep windows rolled up. Check inside your car before entering, including the back seat. If you notice anyone loitering around parking areas, report it to the police.

3. PERSONAL SAFETY PROTOCOL:

Develop daily safety habits such as locking all doors and windows when leaving home, and keeping your car keys ready when walking to your vehicle. Keep a list of emergency contacts in your phone and a physical copy at home. In case of an emergency, call 9-1-1. For non-emergencies, call the Toronto Police at 416-808-2222.

4. PREVENTIVE MEASURES:

Enhance your home security by installing a security system and outdoor lighting. Consider using personal safety technology such as a personal alarm or a safety app on your phone. Engage with your community through neighbourhood watch programs. Report any suspicious activity to the police and keep their non-emergency number handy: 416-808-2222.

Remember, your safety is a priority. Stay vigilant, be aware of your surroundings, and don't hesitate to report any suspicious activity. The Toronto Police Service is here to help and support you."#;

const JUDGE_FORMAT: &str = r#"Respond ONLY with a JSON object in this format:
{"score": <number from 0 to 10>, "reason": "<one sentence explanation>"}"#;

const FAITHFULNESS: &str = r#"You are evaluating whether an answer is faithful to the retrieved context.

Break the answer into its factual claims and check each claim against the context. A claim is supported only if it can be inferred from the context.

CONTEXT:
${var:contexts}

ANSWER:
${var:answer}

Score 10 when every claim is supported by the context and 0 when none are. Scale linearly with the share of supported claims.

${var:format}"#;

const ANSWER_RELEVANCY: &str = r#"You are evaluating whether an answer addresses the question that was asked.

QUESTION:
${var:question}

ANSWER:
${var:answer}

Score 10 when the answer directly and completely addresses the question without unrelated material, and 0 when it is unrelated or evasive. Penalise missing parts of the question and redundant content.

${var:format}"#;

const CONTEXT_PRECISION: &str = r#"You are evaluating how useful the retrieved context passages are for answering a question.

QUESTION:
${var:question}

REFERENCE ANSWER:
${var:ground_truth}

RETRIEVED CONTEXT (in ranked order):
${var:contexts}

For each passage decide whether it was useful in arriving at the reference answer. Score 10 when all useful passages are ranked ahead of the irrelevant ones and most passages are useful, and 0 when no passage is useful.

${var:format}"#;

const CONTEXT_RECALL: &str = r#"You are evaluating whether the retrieved context contains the information needed to produce a reference answer.

QUESTION:
${var:question}

REFERENCE ANSWER:
${var:ground_truth}

RETRIEVED CONTEXT:
${var:contexts}

Break the reference answer into statements and check whether each can be attributed to the context. Score 10 when every statement is attributable and 0 when none are. Scale linearly with the share of attributable statements.

${var:format}"#;

const TEST_SET_SEED: &str = r#"Generate a complex safety-related query for Toronto focusing on ${var:scenario_type}.
Include:
- A specific Toronto neighbourhood
- 2-3 interconnected safety concerns
- Make the scenario challenging and realistic
- Include specific details that would require precise recommendations"#;

const TEST_SET_STRUCTURE: &str = r#"Generate a safety plan request for a Toronto resident, focusing on ${var:scenario_type}, with these specific components:
1. A specific Toronto neighbourhood name, for example one of: ${var:neighbourhoods}
2. 2-3 crime types chosen from ${var:crime_types}, each with a severity of ${var:risk_levels} (format: "Crime: Severity")
3. Three Q&A pairs about the user's context

The request should build on this scenario:
${var:seed_query}

Respond ONLY with a JSON object in this exact format:
{"neighbourhood": "<name>", "crime_types": ["Crime1: Severity", "Crime2: Severity"], "context": ["Q: <question>", "A: <answer>", "Q: <question>", "A: <answer>", "Q: <question>", "A: <answer>"]}"#;

const TEST_SET_GROUND_TRUTH: &str = r#"Create a comprehensive safety plan following this structure:

1. NEIGHBOURHOOD-SPECIFIC ASSESSMENT
2. TARGETED SAFETY RECOMMENDATIONS
3. PERSONAL SAFETY PROTOCOL
4. PREVENTIVE MEASURES

Base the plan on:
USER REQUEST:
${var:question}

VERIFIED RESOURCES:
${var:contexts}

Guidelines for your response:
- Provide specific, actionable advice that can be implemented immediately
- Include both preventive measures and emergency response protocols
- Reference relevant Toronto Police Service programs or initiatives when applicable
- Maintain a supportive and empowering tone while being clear about risks
- Prioritize recommendations based on the specific crime patterns
- Include relevant contact numbers and resources"#;

/// Instruction appended to every judge prompt
pub fn judge_format() -> &'static str {
    JUDGE_FORMAT
}

/// Registry holding every built-in template
pub fn builtin_registry() -> Result<TemplateRegistry, TemplateError> {
    TemplateRegistry::new()
        .with(ANALYSIS_TEMPLATE, ANALYSIS)?
        .with(SYNTHESIS_TEMPLATE, SYNTHESIS)?
        .with(FAITHFULNESS_TEMPLATE, FAITHFULNESS)?
        .with(ANSWER_RELEVANCY_TEMPLATE, ANSWER_RELEVANCY)?
        .with(CONTEXT_PRECISION_TEMPLATE, CONTEXT_PRECISION)?
        .with(CONTEXT_RECALL_TEMPLATE, CONTEXT_RECALL)?
        .with(TEST_SET_SEED_TEMPLATE, TEST_SET_SEED)?
        .with(TEST_SET_STRUCTURE_TEMPLATE, TEST_SET_STRUCTURE)?
        .with(TEST_SET_GROUND_TRUTH_TEMPLATE, TEST_SET_GROUND_TRUTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_has_all_templates() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.names().len(), 9);
        assert!(registry.contains(ANALYSIS_TEMPLATE));
        assert!(registry.contains(SYNTHESIS_TEMPLATE));
    }

    #[test]
    fn test_analysis_slots() {
        let registry = builtin_registry().unwrap();
        let template = registry.get(ANALYSIS_TEMPLATE).unwrap();
        let names: Vec<&str> = template.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["input", "context"]);
    }

    #[test]
    fn test_synthesis_renders_sections_in_order() {
        let registry = builtin_registry().unwrap();
        let prompt = registry
            .render_with(
                SYNTHESIS_TEMPLATE,
                &[
                    ("input", "LOCATION: Agincourt North (129)"),
                    ("analysis", "Auto theft is elevated near parking lots."),
                    ("example_plan", EXAMPLE_SAFETY_PLAN),
                ],
            )
            .unwrap();

        assert!(prompt.contains("<analysis>\nAuto theft is elevated near parking lots.\n</analysis>"));
        assert!(prompt.contains("LOCATION: Agincourt North (129)"));

        let first = prompt.find("1. NEIGHBOURHOOD-SPECIFIC ASSESSMENT:").unwrap();
        let second = prompt.find("2. TARGETED SAFETY RECOMMENDATIONS:").unwrap();
        let third = prompt.find("3. PERSONAL SAFETY PROTOCOL:").unwrap();
        let fourth = prompt.find("4. PREVENTIVE MEASURES:").unwrap();
        assert!(first < second && second < third && third < fourth);
    }

    #[test]
    fn test_example_plan_has_no_sources_section() {
        assert!(!EXAMPLE_SAFETY_PLAN.contains("Sources Consulted:"));
    }

    #[test]
    fn test_judge_templates_need_format_slot() {
        let registry = builtin_registry().unwrap();
        let result = registry.render_with(
            FAITHFULNESS_TEMPLATE,
            &[("contexts", "ctx"), ("answer", "ans")],
        );
        assert!(matches!(
            result,
            Err(TemplateError::MissingVariable { ref name }) if name == "format"
        ));
    }
}
