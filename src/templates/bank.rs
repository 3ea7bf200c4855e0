// src/templates/bank.rs

//! Built-in phrasing variants. `{yield}` already carries its unit and
//! `{confidence}` is a level word (High/Medium/Low).

use super::{Intent, Language};

pub(super) fn builtin_variants(intent: Intent, language: Language) -> &'static [&'static str] {
    use Intent::*;
    use Language::*;
    match (intent, language) {
        (Irrigation, En) => IRRIGATION_EN,
        (Irrigation, Hi) => IRRIGATION_HI,
        (Irrigation, Mr) => IRRIGATION_MR,
        (Fertilizer, En) => FERTILIZER_EN,
        (Fertilizer, Hi) => FERTILIZER_HI,
        (Fertilizer, Mr) => FERTILIZER_MR,
        (Pest, En) => PEST_EN,
        (Pest, Hi) => PEST_HI,
        (Pest, Mr) => PEST_MR,
        (Sowing, En) => SOWING_EN,
        (Sowing, Hi) => SOWING_HI,
        (Sowing, Mr) => SOWING_MR,
        (Yield, En) => YIELD_EN,
        (Yield, Hi) => YIELD_HI,
        (Yield, Mr) => YIELD_MR,
        (Rainfall, En) => RAINFALL_EN,
        (Rainfall, Hi) => RAINFALL_HI,
        (Rainfall, Mr) => RAINFALL_MR,
    }
}

const IRRIGATION_EN: &[&str] = &[
    "For {crop} in {district}, irrigate lightly during {season} if rainfall is {rainfall}.",
    "{district}: Keep soil moisture for {crop} balanced. In {season}, reduce irrigation if rains are {rainfall}.",
    "Ensure {soil} soil for {crop} in {district} is moist but not waterlogged during {season}.",
    "Farmers in {district}: {crop} requires irrigation every 7 days in {season} unless rainfall is high ({rainfall}).",
    "Advice for {crop} in {district}: Irrigate at dawn or dusk in {season} to conserve water.",
    "Maintain consistent soil moisture for {crop}. Adjust irrigation in {district} when rainfall = {rainfall}.",
    "Optimal irrigation schedule for {crop}: Use drip irrigation in {district} during dry {season}.",
    "Do not irrigate {crop} in {district} during {season} if rainfall exceeds {rainfall}.",
    "In {district}, adopt alternate furrow irrigation for {crop} during {season}.",
    "Use soil moisture sensors in {district} for {crop} to decide irrigation frequency in {season}.",
    "Rainfed {crop} in {district} may not require irrigation if expected rainfall = {rainfall}.",
    "Conserve water in {district}. For {crop}, schedule irrigation only if soil dryness is observed in {season}.",
];

const IRRIGATION_HI: &[&str] = &[
    "{district} जिले में {crop} के लिए {season} में वर्षा {rainfall} हो तो हल्की सिंचाई करें।",
    "{crop} के लिए {district} में मिट्टी {soil} बनी रहे। {season} में यदि वर्षा {rainfall} हो तो पानी कम दें।",
    "{district} में किसान {crop} की सिंचाई हर 7 दिन करें, यदि {season} में वर्षा कम ({rainfall}) हो।",
    "{district} जिले में {crop} की सिंचाई सुबह या शाम करें, ताकि जल की बचत हो।",
    "{district}: {crop} के लिए निरंतर नमी जरूरी है। वर्षा {rainfall} के अनुसार पानी दें।",
    "{crop} के लिए ड्रिप सिंचाई अपनाएँ। {district} में {season} के दौरान सर्वोत्तम तरीका है।",
    "यदि {season} में वर्षा {rainfall} से अधिक हो तो {district} में {crop} को पानी न दें।",
    "{district} में {crop} के लिए वैकल्पिक नाली सिंचाई {season} में करें।",
    "{district} में {crop} की मिट्टी सूखने पर ही पानी दें।",
    "{district}: यदि अगले 48 घंटे में वर्षा होने की संभावना है तो {crop} को पानी न दें।",
    "{district} में मिट्टी का प्रकार {soil} है; इसके अनुसार {crop} की सिंचाई समायोजित करें।",
    "पानी की कमी होने पर {district} में {crop} के लिए ड्रिप या सूक्ष्म सिंचाई का उपयोग करें।",
];

const IRRIGATION_MR: &[&str] = &[
    "{district} मध्ये {crop} साठी {season} मध्ये पाऊस {rainfall} असल्यास हलकी पाणी देणे पुरेसे आहे.",
    "{district} मध्ये {crop} साठी {soil} माती ओलसर ठेवा. {season} मध्ये पाऊस {rainfall} असल्यास पाणी कमी द्या.",
    "{district} शेतकरी {crop} ला प्रत्येक ७ दिवसांनी पाणी द्या, जर {season} मध्ये पाऊस कमी ({rainfall}) असेल.",
    "{district} मध्ये {crop} साठी सकाळी किंवा संध्याकाळी पाणी द्या, पाणी बचतीसाठी.",
    "{district}: {crop} ला सतत आर्द्रता लागते. पाऊस {rainfall} प्रमाणे पाणी द्या.",
    "{crop} साठी ठिबक सिंचन करा. {district} मध्ये {season} साठी योग्य आहे.",
    "जर {season} मध्ये पाऊस {rainfall} पेक्षा जास्त असेल तर {district} मध्ये {crop} ला पाणी देऊ नका.",
    "{district} मध्ये {crop} साठी {season} मध्ये आळी-आळी सिंचन करा.",
    "{district} मध्ये माती कोरडी झाल्यावरच {crop} ला पाणी द्या.",
    "{district}: जर पुढील ४८ तासांत पाऊस येण्याची शक्यता असेल तर {crop} ला पाणी देऊ नका.",
    "{district} मध्ये मातीचा रंग {soil} असल्यास पाण्याचे प्रमाण नियमन करा.",
    "{district} मध्ये पाण्याची बचत करण्यासाठी सकाळी व संध्याकाळी सिंचन करा.",
];

const FERTILIZER_EN: &[&str] = &[
    "Use {fertilizer} for {crop} in {district}.",
    "{crop} in {district} needs {fertilizer} during {season} for better yield.",
    "Balanced use of {fertilizer} improves {crop} in {district}.",
    "Avoid over-application of {fertilizer} for {crop} in {district}.",
    "{district} farmers: mix organic manure with {fertilizer} for long-term soil health.",
    "Apply {fertilizer} at sowing for {crop} in {district}, then top-dress as required.",
    "Soil type {soil} in {district} benefits from {fertilizer}.",
    "Split doses of {fertilizer} help {crop} growth in {district}.",
    "For {crop} in {district}, recommended fertilizer is {fertilizer} (soil pH {ph}).",
    "Soil N is {nitrogen}, P is {phosphorus} and K is {potassium}; plan {fertilizer} doses for {crop} in {district} accordingly.",
];

const FERTILIZER_HI: &[&str] = &[
    "{district} जिले में {crop} के लिए {fertilizer} का प्रयोग करें।",
    "{crop} की उपज बढ़ाने के लिए {district} में {season} में {fertilizer} दें।",
    "{district} में जैविक खाद के साथ {fertilizer} मिलाकर उपयोग करें।",
    "{fertilizer} का अधिक उपयोग {district} में {crop} को नुकसान पहुंचा सकता है।",
    "{district} में मिट्टी {soil} है; {fertilizer} उपयुक्त रहेगा।",
    "नाइट्रोजन का स्तर {nitrogen} है; अनुशंसित {fertilizer} का प्रयोग करें।",
    "{district} में {crop} के लिए पत्तों पर छिड़काव हेतु {fertilizer} का उपयोग कर सकते हैं।",
    "{district} में बुवाई के समय {fertilizer} का उपयोग करें।",
    "टॉप ड्रेसिंग के समय {fertilizer} का विभाजित उपयोग करें।",
    "संतुलित उर्वरक योजना अपनाना {district} में फायदेमंद है।",
];

const FERTILIZER_MR: &[&str] = &[
    "{district} मध्ये {crop} साठी {fertilizer} वापरा.",
    "{district} मध्ये {season} मध्ये {crop} ला {fertilizer} द्या, उत्पादन वाढेल.",
    "सेंद्रिय खतासोबत {fertilizer} मिसळून वापरावे.",
    "{fertilizer} चे जास्त प्रमाण {district} मध्ये नुकसान करू शकते.",
    "{district} माती {soil} आहे; त्यानुसार {fertilizer} वापरा.",
    "नाइट्रोजन पातळी {nitrogen} असल्यास N समृद्ध खत वापरा.",
    "{district} मध्ये पेरणी वेळी {fertilizer} द्या.",
    "टॉप ड्रेसिंगसाठी {fertilizer} चे विभाजित प्रमाण फायदेशीर आहे.",
    "{district} मध्ये {crop} साठी शिफारस केलेले खत: {fertilizer}.",
    "संतुलित खत व्यवस्थापनाने {district} मध्ये उपज सुधारता येते.",
];

const PEST_EN: &[&str] = &[
    "Watch {crop} in {district} for pests (recent reports: {pest}); use neem-based treatment if necessary.",
    "{district}: High humidity may increase pest risk for {crop}. Monitor fields (currently {pest}).",
    "Use pheromone traps to reduce pest pressure on {crop} in {district}.",
    "Avoid excess pesticide; use IPM methods to protect {crop} in {district}.",
    "Intercropping can help reduce pest incidence in {district}.",
    "Regular weeding reduces pests for {crop} in {district}.",
    "{district} farmers: choose resistant {crop} varieties to reduce pest damage.",
    "Apply recommended dose only; misuse can harm beneficial insects in {district}.",
    "Pest status for {crop} in {district}: {pest}. Inspect the crop regularly.",
    "If pest infestation on {crop} is severe in {district}, contact the local extension office.",
];

const PEST_HI: &[&str] = &[
    "{district} में {crop} पर कीट का प्रकोप हो सकता है (स्थिति: {pest})। नीम का छिड़काव करें।",
    "{district} में उच्च आर्द्रता कीट का खतरा बढ़ाती है। खेतों की निगरानी करें।",
    "फेरोमोन ट्रैप का प्रयोग {crop} में कीटों को कम करता है।",
    "अत्यधिक कीटनाशक से बचें; {district} में IPM अपनाएँ।",
    "इंटरक्रॉपिंग से {district} में कीट दबाव कम हो सकता है।",
    "समय पर निराई-गुड़ाई करने से {crop} में कीट कम होते हैं।",
    "{district} में {crop} की प्रतिरोधी किस्में अपनाएँ।",
    "कीटनाशक की सुझाई गई खुराक ही प्रयोग करें।",
    "{district} में {crop} की कीट स्थिति: {pest}; नियमित जाँच करें।",
    "गंभीर स्थिति में {district} के स्थानीय कृषि कार्यालय से संपर्क करें।",
];

const PEST_MR: &[&str] = &[
    "{district} मध्ये {crop} वर किडीचा धोका आहे (स्थिती: {pest}); नीम फवारणी करा.",
    "उच्च आर्द्रता {district} मध्ये कीड वाढवू शकते; शेत तपासा.",
    "फेरोमोन ट्रॅप वापरून {crop} वरील कीड कमी करा.",
    "खूप कीटकनाशक वापरणे टाळा; {district} मध्ये IPM वापरा.",
    "इंटरक्रॉपिंगने {district} मध्ये कीड कमी होऊ शकते.",
    "वेळेवर तण काढल्याने {crop} वरील कीड कमी होते.",
    "{district} मध्ये {crop} च्या प्रतिरोधक जाती वापरा.",
    "सुचवलेल्या प्रमाणातच कीटकनाशक वापरा.",
    "{district} मध्ये {crop} ची कीड स्थिती: {pest}; नियमित तपासणी करा.",
    "गंभीर प्रादुर्भाव आढळल्यास {district} च्या स्थानिक कृषी कार्यालयाला कळवा.",
];

const SOWING_EN: &[&str] = &[
    "Sow {crop} in {district} after the first steady rains in {season}.",
    "{district}: Delay sowing if expected rainfall is {rainfall} mm.",
    "Best sowing window for {crop} in {district} is {season}.",
    "Use certified seed for {crop} in {district}.",
    "Avoid early sowing of {crop} to reduce pest risk in {district}.",
    "Check soil moisture ({soil} soil) before sowing {crop} in {district}.",
    "Line sowing improves {crop} yield in {district}.",
    "Do not sow {crop} if heavy rains ({rainfall} mm) are forecast in {district}.",
    "Prepare the seedbed according to the soil ({soil}) in {district} before sowing.",
    "Adjust sowing depth of {crop} per local recommendations for {district}.",
];

const SOWING_HI: &[&str] = &[
    "{district} में {season} की पहली स्थिर वर्षा के बाद {crop} बोएँ।",
    "यदि अनुमानित वर्षा {rainfall} मिमी हो तो {district} में बुवाई में विलंब करें।",
    "{district} में {crop} की सर्वोत्तम बुवाई अवधि {season} है।",
    "{crop} के लिए प्रमाणित बीज का उपयोग करें।",
    "शुरुआती बुवाई से {district} में कीट का खतरा बढ़ सकता है।",
    "{district} में मिट्टी {soil} की जांच कर {crop} की बुवाई करें।",
    "लाइन बुवाई से {crop} की उपज में सुधार होता है।",
    "{district} में भारी वर्षा ({rainfall} मिमी) की आशंका होने पर बुवाई न करें।",
    "बुवाई से पहले {district} में खेत तैयार करें।",
    "{crop} की बुवाई गहराई को स्थानीय सलाह के अनुसार समायोजित करें।",
];

const SOWING_MR: &[&str] = &[
    "{district} मध्ये {season} मध्ये प्रथम सातत्याने पाऊस झाल्यानंतर {crop} ची पेरणी करा.",
    "जर अंदाजे पाऊस {rainfall} मिमी असेल तर {district} मध्ये पेरणी उशिरा करा.",
    "{district} मध्ये {crop} ची सर्वोत्तम पेरणी वेळ {season} आहे.",
    "{crop} साठी प्रमाणित बियाणे वापरा.",
    "लवकर पेरणी केल्याने {district} मध्ये किडीचा धोका वाढू शकतो.",
    "{district} मध्ये माती {soil} तपासून {crop} ची पेरणी करा.",
    "ओळीत पेरणीने {crop} चे उत्पादन वाढू शकते.",
    "{district} मध्ये मोठ्या पावसाचा ({rainfall} मिमी) अंदाज असल्यास पेरणी टाळा.",
    "पेरणीपूर्वी {district} मध्ये जमिनीची तयारी करा.",
    "{crop} ची पेरणी खोली स्थानिक सल्ल्यानुसार समायोजित करा.",
];

const YIELD_EN: &[&str] = &[
    "Estimated yield for {crop} in {district} is {yield} with {confidence} confidence.",
    "{district}: With current conditions, {crop} may yield around {yield}.",
    "Predicted yield for {crop} in {district}: {yield}; confidence {confidence}.",
    "Improved irrigation and correct {fertilizer} may increase {crop} yield beyond {yield}.",
    "Yield estimate for {crop} in {district} is {yield} (based on rainfall {rainfall}).",
    "Current soil N={nitrogen}, pH={ph}. Estimated yield: {yield} for {crop}.",
    "The model predicts {yield} for {crop} in {district}.",
    "With recommended practices, {crop} in {district} could approach {yield}.",
    "Yield forecast: {yield} ({confidence} confidence) for {crop} in {district}.",
    "Note: the yield estimate of {yield} for {crop} is indicative; local management can change outcomes.",
];

const YIELD_HI: &[&str] = &[
    "{district} में {crop} का अनुमानित उत्पादन: {yield} (विश्वसनीयता {confidence})।",
    "{district}: वर्तमान परिस्थितियों में {crop} की उपज लगभग {yield} हो सकती है।",
    "{crop} के लिए अनुमानित उपज {yield} है; विश्वास {confidence}।",
    "उचित सिंचाई और {fertilizer} उपयोग से {crop} की उपज {yield} से अधिक हो सकती है।",
    "वर्षा {rainfall} पर आधारित अनुमानित उपज: {yield}।",
    "मिट्टी N={nitrogen}, pH={ph} के साथ {crop} की अनुमानित उपज {yield}।",
    "{district} में {crop} की भविष्यवाणी: {yield}।",
    "{district} में अनुशंसित प्रथाओं से {crop} की उपज {yield} तक पहुँच सकती है।",
    "उपज अनुमान केवल संकेतक है: {yield}।",
    "विश्वास स्तर {confidence} के साथ {crop} की उपज {yield} अनुमानित है।",
];

const YIELD_MR: &[&str] = &[
    "{district} मध्ये {crop} चे अपेक्षित उत्पादन: {yield} (विश्वासार्हता {confidence}).",
    "{district}: सध्याच्या परिस्थितीत {crop} ची उपज सुमारे {yield} असू शकते.",
    "{crop} साठी अंदाजित उत्पादन {yield}; विश्वास {confidence}.",
    "योग्य सिंचन आणि {fertilizer} मुळे {crop} ची उपज {yield} पेक्षा वाढू शकते.",
    "पाऊस {rainfall} वर आधारित उत्पादन अंदाज: {yield}.",
    "माती N={nitrogen}, pH={ph} असल्यास {crop} चा उत्पादन अंदाज {yield}.",
    "{district} मध्ये {crop} चे उत्पादन {yield} अपेक्षित आहे.",
    "शिफारसीनुसार केल्यास {crop} ची उपज {yield} पर्यंत वाढू शकते.",
    "उपज अंदाज निर्देशात्मक आहे: {yield}.",
    "विश्वास पातळी {confidence} सह उत्पादन {yield} अंदाजित आहे.",
];

const RAINFALL_EN: &[&str] = &[
    "Rainfall record for {district}: {rainfall} mm and avg temp {temperature}°C.",
    "{district}: Historical rainfall {rainfall} mm; check forecasts for upcoming days.",
    "Expected rainfall impact on {crop}: {rainfall} mm noted in records for {district}.",
    "Forecast outlook: {rainfall} mm could occur in {district} during {season}.",
    "Rainfall of {rainfall} mm may reduce the need for irrigation in {district}.",
    "Local rainfall {rainfall} mm recorded in {district}; temperature {temperature}°C.",
    "Rain stats ({district}): {rainfall} mm recently, please plan sowing accordingly.",
    "{district} has recorded {rainfall} mm on average; plan {crop} operations around the rains.",
    "{district} rainfall data: {rainfall} mm (useful for irrigation planning).",
    "Rainfall {rainfall} mm: adjust fertilizer and sowing decisions for {crop}.",
];

const RAINFALL_HI: &[&str] = &[
    "{district} में रिकॉर्ड वर्षा: {rainfall} मिमी और औसत तापमान {temperature}°C।",
    "{district}: ऐतिहासिक वर्षा {rainfall} मिमी; आने वाले दिनों के पूर्वानुमान देखें।",
    "{crop} पर संभावित प्रभाव: {district} में वर्षा {rainfall} मिमी रिकॉर्ड की गई।",
    "{district} में {season} के दौरान {rainfall} मिमी की उम्मीद हो सकती है।",
    "{district} में वर्षा {rainfall} मिमी होने पर सिंचाई कम करें।",
    "{district} में हाल ही में {rainfall} मिमी रिकॉर्ड हुआ; योजना बनाएं।",
    "{district} की वर्षा जानकारी: {rainfall} मिमी (बुवाई/सिंचाई के लिए उपयोगी)।",
    "वर्षा का प्रभाव {rainfall} मिमी: {district} में सावधानी बरतें।",
    "{district} में तापमान {temperature}°C और वर्षा {rainfall} मिमी।",
    "{district} में वर्षा {rainfall} मिमी के अनुसार उर्वरक योजना समायोजित करें।",
];

const RAINFALL_MR: &[&str] = &[
    "{district} मध्ये नोंदवलेला पाऊस: {rainfall} मिमी आणि सरासरी तापमान {temperature}°C.",
    "{district}: ऐतिहासिक पाऊस {rainfall} मिमी आहे; आगामी अंदाज पहा.",
    "{crop} वर संभाव्य प्रभाव: {district} मध्ये पाऊस {rainfall} मिमी नोंदवला आहे.",
    "{district} मध्ये {season} दरम्यान {rainfall} मिमी पाऊस अपेक्षित असू शकतो.",
    "{district} मध्ये पाऊस {rainfall} मिमी असल्यास सिंचन कमी करा.",
    "{district} मध्ये अलीकडील पाऊस {rainfall} मिमी नोंदला आहे; नियोजन करा.",
    "{district} चा पाऊस डेटा: {rainfall} मिमी (पेरणी/सिंचन सल्ल्यासाठी उपयुक्त).",
    "पाऊस {rainfall} मिमी: {district} मध्ये काळजी घ्या.",
    "{district} मध्ये तापमान {temperature}°C व पाऊस {rainfall} मिमी.",
    "{district} मध्ये पाऊस {rainfall} मिमी असल्यास खत योजना बदला.",
];
