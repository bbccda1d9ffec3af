//! Synthetic test set generation
//!
//! Each case is built in three model calls: a free-form seed scenario, a
//! structured request derived from it, and a reference plan written against
//! the top retrieved chunks for that request.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::llm_judge::first_json_object;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::evaluation::{
    StructuredInput, TestCase, TestCaseMetadata, TestSet, SCENARIO_TYPES,
};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::prompt::{
    TemplateRegistry, TEST_SET_GROUND_TRUTH_TEMPLATE, TEST_SET_SEED_TEMPLATE,
    TEST_SET_STRUCTURE_TEMPLATE,
};
use crate::domain::safety_plan::SafetyPlanRequest;
use crate::domain::vector_store::VectorStore;
use crate::domain::DomainError;
use crate::infrastructure::safety_plan::{format_context, retrieve_context};

pub const CRIME_TYPES: [&str; 4] = ["Assault", "Auto Theft", "Break and Enter", "Robbery"];
pub const RISK_LEVELS: [&str; 3] = ["Low", "Medium", "High"];

/// Neighbourhoods offered to the model per case
const NEIGHBOURHOOD_SAMPLE: usize = 8;

pub const TORONTO_NEIGHBOURHOODS: [&str; 157] = [
    "Agincourt North (129)",
    "Agincourt South-Malvern West (128)",
    "Alderwood (20)",
    "Annex (95)",
    "Avondale (153)",
    "Banbury-Don Mills (42)",
    "Bathurst Manor (34)",
    "Bay-Cloverhill (169)",
    "Bayview Village (52)",
    "Bayview Woods-Steeles (49)",
    "Bedford Park-Nortown (39)",
    "Beechborough-Greenbrook (112)",
    "Bendale South (157)",
    "Bendale-Glen Andrew (156)",
    "Birchcliffe-Cliffside (122)",
    "Black Creek (24)",
    "Blake-Jones (69)",
    "Briar Hill-Belgravia (108)",
    "Bridle Path-Sunnybrook-York Mills (41)",
    "Broadview North (57)",
    "Brookhaven-Amesbury (30)",
    "Cabbagetown-South St.James Town (71)",
    "Caledonia-Fairbank (109)",
    "Casa Loma (96)",
    "Centennial Scarborough (133)",
    "Church-Wellesley (167)",
    "Clairlea-Birchmount (120)",
    "Clanton Park (33)",
    "Cliffcrest (123)",
    "Corso Italia-Davenport (92)",
    "Danforth (66)",
    "Danforth East York (59)",
    "Don Valley Village (47)",
    "Dorset Park (126)",
    "Dovercourt Village (172)",
    "Downsview (155)",
    "Downtown Yonge East (168)",
    "Dufferin Grove (83)",
    "East End-Danforth (62)",
    "East L'Amoreaux (148)",
    "East Willowdale (152)",
    "Edenbridge-Humber Valley (9)",
    "Eglinton East (138)",
    "Elms-Old Rexdale (5)",
    "Englemount-Lawrence (32)",
    "Eringate-Centennial-West Deane (11)",
    "Etobicoke City Centre (159)",
    "Etobicoke West Mall (13)",
    "Fenside-Parkwoods (150)",
    "Flemingdon Park (44)",
    "Forest Hill North (102)",
    "Forest Hill South (101)",
    "Fort York-Liberty Village (163)",
    "Glenfield-Jane Heights (25)",
    "Golfdale-Cedarbrae-Woburn (141)",
    "Greenwood-Coxwell (65)",
    "Guildwood (140)",
    "Harbourfront-CityPlace (165)",
    "Henry Farm (53)",
    "High Park North (88)",
    "High Park-Swansea (87)",
    "Highland Creek (134)",
    "Hillcrest Village (48)",
    "Humber Bay Shores (161)",
    "Humber Heights-Westmount (8)",
    "Humber Summit (21)",
    "Humbermede (22)",
    "Humewood-Cedarvale (106)",
    "Ionview (125)",
    "Islington (158)",
    "Junction Area (90)",
    "Junction-Wallace Emerson (171)",
    "Keelesdale-Eglinton West (110)",
    "Kennedy Park (124)",
    "Kensington-Chinatown (78)",
    "Kingsview Village-The Westway (6)",
    "Kingsway South (15)",
    "Lambton Baby Point (114)",
    "L'Amoreaux West (147)",
    "Lansing-Westgate (38)",
    "Lawrence Park North (105)",
    "Lawrence Park South (103)",
    "Leaside-Bennington (56)",
    "Little Portugal (84)",
    "Long Branch (19)",
    "Malvern East (146)",
    "Malvern West (145)",
    "Maple Leaf (29)",
    "Markland Wood (12)",
    "Milliken (130)",
    "Mimico-Queensway (160)",
    "Morningside (135)",
    "Morningside Heights (144)",
    "Moss Park (73)",
    "Mount Dennis (115)",
    "Mount Olive-Silverstone-Jamestown (2)",
    "Mount Pleasant East (99)",
    "New Toronto (18)",
    "Newtonbrook East (50)",
    "Newtonbrook West (36)",
    "North Riverdale (68)",
    "North St.James Town (74)",
    "North Toronto (173)",
    "Oakdale-Beverley Heights (154)",
    "Oakridge (121)",
    "Oakwood Village (107)",
    "O'Connor-Parkview (54)",
    "Old East York (58)",
    "Palmerston-Little Italy (80)",
    "Parkwoods-O'Connor Hills (149)",
    "Pelmo Park-Humberlea (23)",
    "Playter Estates-Danforth (67)",
    "Pleasant View (46)",
    "Princess-Rosethorn (10)",
    "Regent Park (72)",
    "Rexdale-Kipling (4)",
    "Rockcliffe-Smythe (111)",
    "Roncesvalles (86)",
    "Rosedale-Moore Park (98)",
    "Runnymede-Bloor West Village (89)",
    "Rustic (28)",
    "Scarborough Village (139)",
    "South Eglinton-Davisville (174)",
    "South Parkdale (85)",
    "South Riverdale (70)",
    "St.Andrew-Windfields (40)",
    "Steeles (116)",
    "Stonegate-Queensway (16)",
    "Tam O'Shanter-Sullivan (118)",
    "Taylor-Massey (61)",
    "The Beaches (63)",
    "Thistletown-Beaumond Heights (3)",
    "Thorncliffe Park (55)",
    "Trinity-Bellwoods (81)",
    "University (79)",
    "Victoria Village (43)",
    "Wellington Place (164)",
    "West Hill (136)",
    "West Humber-Clairville (1)",
    "West Queen West (162)",
    "West Rouge (143)",
    "Westminster-Branson (35)",
    "Weston (113)",
    "Weston-Pelham Park (91)",
    "Wexford/Maryvale (119)",
    "Willowdale West (37)",
    "Willowridge-Martingrove-Richview (7)",
    "Woburn North (142)",
    "Woodbine Corridor (64)",
    "Woodbine-Lumsden (60)",
    "Wychwood (94)",
    "Yonge-Bay Corridor (170)",
    "Yonge-Doris (151)",
    "Yonge-Eglinton (100)",
    "Yonge-St.Clair (97)",
    "York University Heights (27)",
    "Yorkdale-Glen Park (31)",
];

/// Settings for test set generation
#[derive(Debug, Clone)]
pub struct TestSetGeneratorConfig {
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: Option<usize>,
    pub temperature: f32,
    pub context_k: usize,
}

impl Default for TestSetGeneratorConfig {
    fn default() -> Self {
        Self {
            chat_model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-large".to_string(),
            embedding_dimensions: None,
            temperature: 0.7,
            context_k: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StructuredReply {
    neighbourhood: String,
    #[serde(default)]
    crime_types: Vec<String>,
    #[serde(default)]
    context: Vec<String>,
}

/// Builds question sets with reference plans and reference context
pub struct TestSetGenerator<P, E, V>
where
    P: LlmProvider,
    E: EmbeddingProvider,
    V: VectorStore,
{
    llm: Arc<P>,
    embedder: Arc<E>,
    store: Arc<V>,
    templates: Arc<TemplateRegistry>,
    config: TestSetGeneratorConfig,
}

impl<P, E, V> TestSetGenerator<P, E, V>
where
    P: LlmProvider,
    E: EmbeddingProvider,
    V: VectorStore,
{
    pub fn new(
        llm: Arc<P>,
        embedder: Arc<E>,
        store: Arc<V>,
        templates: Arc<TemplateRegistry>,
        config: TestSetGeneratorConfig,
    ) -> Self {
        Self {
            llm,
            embedder,
            store,
            templates,
            config,
        }
    }

    /// Generate `cases_per_type` cases for every scenario type
    pub async fn generate(&self, cases_per_type: usize) -> TestSet {
        let mut cases = Vec::new();
        let mut attempt = 0;

        for scenario in SCENARIO_TYPES {
            info!(scenario, cases_per_type, "Generating scenarios");

            for _ in 0..cases_per_type {
                match self.generate_case(scenario, attempt).await {
                    Ok(case) => cases.push(case),
                    Err(e) => warn!(scenario, error = %e, "Skipping generated case"),
                }
                attempt += 1;
            }
        }

        info!(total = cases.len(), "Test set generated");
        TestSet::new(self.config.chat_model.clone(), cases)
    }

    pub async fn generate_case(
        &self,
        scenario: &str,
        attempt: usize,
    ) -> Result<TestCase, DomainError> {
        let seed_prompt = self
            .templates
            .render_with(TEST_SET_SEED_TEMPLATE, &[("scenario_type", scenario)])?;
        let seed = self.complete(seed_prompt, false).await?;

        let neighbourhoods = neighbourhood_sample(attempt).join(", ");
        let crime_types = CRIME_TYPES.join(", ");
        let risk_levels = RISK_LEVELS.join("/");
        let structure_prompt = self.templates.render_with(
            TEST_SET_STRUCTURE_TEMPLATE,
            &[
                ("scenario_type", scenario),
                ("neighbourhoods", &neighbourhoods),
                ("crime_types", &crime_types),
                ("risk_levels", &risk_levels),
                ("seed_query", &seed),
            ],
        )?;
        let request = parse_structured_request(&self.complete(structure_prompt, true).await?)?;

        let question = request.format_query();
        let contexts = retrieve_context(
            self.embedder.as_ref(),
            self.store.as_ref(),
            &self.config.embedding_model,
            self.config.embedding_dimensions,
            question.as_str(),
            self.config.context_k,
        )
        .await?;

        let ground_truth_prompt = self.templates.render_with(
            TEST_SET_GROUND_TRUTH_TEMPLATE,
            &[
                ("question", question.as_str()),
                ("contexts", &format_context(&contexts)),
            ],
        )?;
        let ground_truth = self.complete(ground_truth_prompt, false).await?;

        Ok(TestCase {
            question: question.as_str().trim().to_string(),
            ground_truth: vec![ground_truth],
            ground_truth_context: contexts.into_iter().map(|c| c.content).collect(),
            metadata: TestCaseMetadata {
                structured_input: StructuredInput::from(&request),
                question_type: scenario.to_string(),
            },
        })
    }

    async fn complete(&self, prompt: String, json_output: bool) -> Result<String, DomainError> {
        let request = LlmRequest::builder()
            .user(prompt)
            .temperature(self.config.temperature)
            .json_output(json_output)
            .build();

        let response = self.llm.chat(&self.config.chat_model, request).await?;
        Ok(response.content().trim().to_string())
    }
}

/// Rotating window over the neighbourhood list so cases spread across the city
fn neighbourhood_sample(attempt: usize) -> Vec<&'static str> {
    let start = (attempt * NEIGHBOURHOOD_SAMPLE) % TORONTO_NEIGHBOURHOODS.len();
    TORONTO_NEIGHBOURHOODS
        .iter()
        .cycle()
        .skip(start)
        .take(NEIGHBOURHOOD_SAMPLE)
        .copied()
        .collect()
}

fn parse_structured_request(reply: &str) -> Result<SafetyPlanRequest, DomainError> {
    if !reply.contains('{') {
        return Err(DomainError::evaluation(
            "No JSON object in structured request reply",
        ));
    }
    let parsed: StructuredReply = first_json_object(reply)
        .map_err(|e| DomainError::evaluation(format!("Invalid structured request: {}", e)))?;

    let request = SafetyPlanRequest::new(parsed.neighbourhood.trim(), parsed.crime_types)
        .with_context(parsed.context);
    request.validate()?;
    Ok(request)
}
