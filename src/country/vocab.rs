// src/country/vocab.rs

/// Canonical short country names.
pub static CANONICAL_NAMES: &[&str] = &[
    "Afghanistan",
    "Aland Islands",
    "Albania",
    "Algeria",
    "American Samoa",
    "Andorra",
    "Angola",
    "Anguilla",
    "Antarctica",
    "Antigua and Barbuda",
    "Argentina",
    "Armenia",
    "Aruba",
    "Australia",
    "Austria",
    "Azerbaijan",
    "Bahamas",
    "Bahrain",
    "Bangladesh",
    "Barbados",
    "Belarus",
    "Belgium",
    "Belize",
    "Benin",
    "Bermuda",
    "Bhutan",
    "Bolivia",
    "Bonaire, Saint Eustatius and Saba",
    "Bosnia and Herzegovina",
    "Botswana",
    "Bouvet Island",
    "Brazil",
    "British Indian Ocean Territory",
    "British Virgin Islands",
    "Brunei Darussalam",
    "Bulgaria",
    "Burkina Faso",
    "Burundi",
    "Cambodia",
    "Cameroon",
    "Canada",
    "Cape Verde",
    "Cayman Islands",
    "Central African Republic",
    "Chad",
    "Chile",
    "China",
    "Christmas Island",
    "Cocos (Keeling) Islands",
    "Colombia",
    "Comoros",
    "Congo Republic",
    "Cook Islands",
    "Costa Rica",
    "Cote d'Ivoire",
    "Croatia",
    "Cuba",
    "Curacao",
    "Cyprus",
    "Czechia",
    "DR Congo",
    "Denmark",
    "Djibouti",
    "Dominica",
    "Dominican Republic",
    "Ecuador",
    "Egypt",
    "El Salvador",
    "Equatorial Guinea",
    "Eritrea",
    "Estonia",
    "Eswatini",
    "Ethiopia",
    "Faeroe Islands",
    "Falkland Islands",
    "Fiji",
    "Finland",
    "France",
    "French Guiana",
    "French Polynesia",
    "French Southern Territories",
    "Gabon",
    "Gambia",
    "Georgia",
    "Germany",
    "Ghana",
    "Gibraltar",
    "Greece",
    "Greenland",
    "Grenada",
    "Guadeloupe",
    "Guam",
    "Guatemala",
    "Guernsey",
    "Guinea",
    "Guinea-Bissau",
    "Guyana",
    "Haiti",
    "Heard and McDonald Islands",
    "Honduras",
    "Hong Kong",
    "Hungary",
    "Iceland",
    "India",
    "Indonesia",
    "Iran",
    "Iraq",
    "Ireland",
    "Isle of Man",
    "Israel",
    "Italy",
    "Jamaica",
    "Japan",
    "Jersey",
    "Jordan",
    "Kazakhstan",
    "Kenya",
    "Kiribati",
    "Kosovo",
    "Kuwait",
    "Kyrgyz Republic",
    "Laos",
    "Latvia",
    "Lebanon",
    "Lesotho",
    "Liberia",
    "Libya",
    "Liechtenstein",
    "Lithuania",
    "Luxembourg",
    "Macau",
    "Madagascar",
    "Malawi",
    "Malaysia",
    "Maldives",
    "Mali",
    "Malta",
    "Marshall Islands",
    "Martinique",
    "Mauritania",
    "Mauritius",
    "Mayotte",
    "Mexico",
    "Micronesia, Fed. Sts.",
    "Moldova",
    "Monaco",
    "Mongolia",
    "Montenegro",
    "Montserrat",
    "Morocco",
    "Mozambique",
    "Myanmar",
    "Namibia",
    "Nauru",
    "Nepal",
    "Netherlands",
    "New Caledonia",
    "New Zealand",
    "Nicaragua",
    "Niger",
    "Nigeria",
    "Niue",
    "Norfolk Island",
    "North Korea",
    "North Macedonia",
    "Northern Mariana Islands",
    "Norway",
    "Oman",
    "Pakistan",
    "Palau",
    "Palestine",
    "Panama",
    "Papua New Guinea",
    "Paraguay",
    "Peru",
    "Philippines",
    "Pitcairn",
    "Poland",
    "Portugal",
    "Puerto Rico",
    "Qatar",
    "Reunion",
    "Romania",
    "Russia",
    "Rwanda",
    "Samoa",
    "San Marino",
    "Sao Tome and Principe",
    "Saudi Arabia",
    "Senegal",
    "Serbia",
    "Seychelles",
    "Sierra Leone",
    "Singapore",
    "Sint Maarten",
    "Slovakia",
    "Slovenia",
    "Solomon Islands",
    "Somalia",
    "South Africa",
    "South Georgia and South Sandwich Is",
    "South Korea",
    "South Sudan",
    "Spain",
    "Sri Lanka",
    "St. Barths",
    "St. Helena",
    "St. Kitts and Nevis",
    "St. Lucia",
    "St. Martin",
    "St. Pierre and Miquelon",
    "St. Vincent and the Grenadines",
    "Sudan",
    "Suriname",
    "Svalbard and Jan Mayen Islands",
    "Sweden",
    "Switzerland",
    "Syria",
    "Taiwan",
    "Tajikistan",
    "Tanzania",
    "Thailand",
    "Timor-Leste",
    "Togo",
    "Tokelau",
    "Tonga",
    "Trinidad and Tobago",
    "Tunisia",
    "Turkey",
    "Turkmenistan",
    "Turks and Caicos Islands",
    "Tuvalu",
    "Uganda",
    "Ukraine",
    "United Arab Emirates",
    "United Kingdom",
    "United States",
    "United States Minor Outlying Islands",
    "United States Virgin Islands",
    "Uruguay",
    "Uzbekistan",
    "Vanuatu",
    "Vatican",
    "Venezuela",
    "Vietnam",
    "Wallis and Futuna Islands",
    "Western Sahara",
    "Yemen",
    "Zambia",
    "Zimbabwe",
];

/// Synonyms, historical names and source-specific spellings, as (alias, canonical).
pub static ALIASES: &[(&str, &str)] = &[
    ("Åland Islands", "Aland Islands"),
    ("Bahamas, The", "Bahamas"),
    ("Bolivia (Plurin. State of)", "Bolivia"),
    ("Bolivia (Plurinational State of)", "Bolivia"),
    ("Brunei", "Brunei Darussalam"),
    ("Burma", "Myanmar"),
    ("Cabo Verde", "Cape Verde"),
    ("China, Hong Kong SAR", "Hong Kong"),
    ("China, Macao SAR", "Macau"),
    ("Macao", "Macau"),
    ("Congo", "Congo Republic"),
    ("Republic of the Congo", "Congo Republic"),
    ("Congo, Rep.", "Congo Republic"),
    ("Dem. Rep. of the Congo", "DR Congo"),
    ("Democratic Republic of the Congo", "DR Congo"),
    ("Congo, Dem. Rep.", "DR Congo"),
    ("Côte d'Ivoire", "Cote d'Ivoire"),
    ("Côte d’Ivoire", "Cote d'Ivoire"),
    ("Ivory Coast", "Cote d'Ivoire"),
    ("Curaçao", "Curacao"),
    ("Czech Republic", "Czechia"),
    ("Dem. People's Rep. Korea", "North Korea"),
    ("Democratic People's Republic of Korea", "North Korea"),
    ("Egypt, Arab Rep.", "Egypt"),
    ("Faroe Islands", "Faeroe Islands"),
    ("Falkland Islands (Malvinas)", "Falkland Islands"),
    ("Gambia, The", "Gambia"),
    ("Holy See", "Vatican"),
    ("Iran (Islamic Republic of)", "Iran"),
    ("Iran, Islamic Rep.", "Iran"),
    ("Korea, Rep.", "South Korea"),
    ("Republic of Korea", "South Korea"),
    ("Kyrgyzstan", "Kyrgyz Republic"),
    ("Lao People's Dem. Rep.", "Laos"),
    ("Lao PDR", "Laos"),
    ("Micronesia (Fed. States of)", "Micronesia, Fed. Sts."),
    ("Micronesia (country)", "Micronesia, Fed. Sts."),
    ("Republic of Moldova", "Moldova"),
    ("Macedonia", "North Macedonia"),
    ("The former Yugoslav Rep. of Macedonia", "North Macedonia"),
    ("State of Palestine", "Palestine"),
    ("Réunion", "Reunion"),
    ("Russian Federation", "Russia"),
    ("Saint Kitts and Nevis", "St. Kitts and Nevis"),
    ("Saint Lucia", "St. Lucia"),
    ("Saint Vincent & Grenadines", "St. Vincent and the Grenadines"),
    ("Saint Vincent and the Grenadines", "St. Vincent and the Grenadines"),
    ("Slovak Republic", "Slovakia"),
    ("Swaziland", "Eswatini"),
    ("Syrian Arab Republic", "Syria"),
    ("East Timor", "Timor-Leste"),
    ("Türkiye", "Turkey"),
    ("United Rep. of Tanzania", "Tanzania"),
    ("United Republic of Tanzania", "Tanzania"),
    ("United Kingdom of Great Britain and Northern Ireland", "United Kingdom"),
    ("United States of America", "United States"),
    ("Venezuela (Boliv. Rep. of)", "Venezuela"),
    ("Venezuela (Bolivarian Republic of)", "Venezuela"),
    ("Viet Nam", "Vietnam"),
    ("Yemen, Rep.", "Yemen"),
];
