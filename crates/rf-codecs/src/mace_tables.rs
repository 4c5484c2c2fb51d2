//! MACE coefficient tables.

/// Index deltas for the 3-bit MACE codewords.
pub(crate) const INDEX_DELTA_3BIT: [i32; 8] = [-13, 8, 76, 222, 222, 76, 8, -13];

/// Index deltas for the 2-bit MACE codewords.
pub(crate) const INDEX_DELTA_2BIT: [i32; 4] = [-18, 140, 140, -18];

/// Step magnitudes for 3-bit codewords, one row per quantized index.
pub(crate) const STEP_3BIT: [[i16; 4]; 128] = [
    [   37,   116,   206,   330], [   39,   121,   216,   346],
    [   41,   127,   225,   361], [   42,   132,   235,   377],
    [   44,   137,   245,   392], [   46,   144,   256,   410],
    [   48,   150,   267,   428], [   51,   157,   280,   449],
    [   53,   165,   293,   470], [   55,   172,   306,   490],
    [   58,   179,   319,   511], [   60,   187,   333,   534],
    [   63,   195,   348,   557], [   66,   205,   364,   583],
    [   69,   214,   380,   609], [   72,   223,   396,   635],
    [   75,   233,   414,   663], [   79,   244,   433,   694],
    [   82,   254,   453,   725], [   86,   265,   472,   756],
    [   90,   278,   495,   792], [   94,   290,   516,   826],
    [   98,   303,   538,   862], [  102,   316,   562,   901],
    [  107,   331,   588,   942], [  112,   345,   614,   983],
    [  117,   361,   641,  1027], [  122,   377,   670,  1074],
    [  127,   394,   701,  1123], [  133,   411,   732,  1172],
    [  139,   430,   764,  1224], [  145,   449,   799,  1280],
    [  152,   469,   835,  1337], [  159,   490,   872,  1397],
    [  166,   512,   911,  1459], [  173,   535,   951,  1523],
    [  181,   558,   993,  1590], [  189,   584,  1038,  1663],
    [  197,   610,  1085,  1738], [  206,   637,  1133,  1815],
    [  215,   665,  1183,  1895], [  225,   695,  1237,  1980],
    [  235,   726,  1291,  2068], [  246,   759,  1349,  2161],
    [  257,   792,  1409,  2257], [  268,   828,  1472,  2357],
    [  280,   865,  1538,  2463], [  293,   903,  1606,  2572],
    [  306,   944,  1678,  2688], [  319,   986,  1753,  2807],
    [  334,  1030,  1832,  2933], [  349,  1076,  1914,  3065],
    [  364,  1124,  1999,  3202], [  380,  1174,  2088,  3344],
    [  398,  1227,  2182,  3494], [  415,  1281,  2278,  3649],
    [  434,  1339,  2380,  3811], [  453,  1398,  2486,  3982],
    [  473,  1461,  2598,  4160], [  495,  1526,  2714,  4346],
    [  517,  1594,  2835,  4540], [  540,  1665,  2961,  4741],
    [  564,  1740,  3093,  4953], [  589,  1817,  3231,  5174],
    [  615,  1898,  3375,  5405], [  643,  1983,  3526,  5646],
    [  671,  2071,  3683,  5898], [  701,  2164,  3848,  6161],
    [  733,  2260,  4020,  6438], [  765,  2361,  4199,  6724],
    [  799,  2467,  4386,  7024], [  835,  2577,  4582,  7338],
    [  872,  2692,  4786,  7664], [  911,  2812,  5000,  8007],
    [  952,  2937,  5223,  8364], [  994,  3068,  5456,  8737],
    [ 1039,  3205,  5700,  9127], [ 1085,  3348,  5954,  9534],
    [ 1133,  3497,  6220,  9960], [ 1184,  3653,  6497, 10404],
    [ 1237,  3816,  6787, 10868], [ 1292,  3987,  7090, 11353],
    [ 1350,  4165,  7406, 11859], [ 1410,  4350,  7737, 12388],
    [ 1473,  4544,  8082, 12941], [ 1539,  4747,  8442, 13518],
    [ 1607,  4959,  8819, 14121], [ 1679,  5180,  9212, 14751],
    [ 1754,  5411,  9623, 15409], [ 1832,  5652, 10052, 16096],
    [ 1914,  5904, 10500, 16814], [ 1999,  6168, 10969, 17564],
    [ 2088,  6443, 11458, 18347], [ 2181,  6730, 11969, 19166],
    [ 2279,  7030, 12503, 20020], [ 2380,  7344, 13060, 20913],
    [ 2486,  7671, 13642, 21845], [ 2597,  8013, 14250, 22819],
    [ 2713,  8370, 14885, 23835], [ 2834,  8744, 15549, 24898],
    [ 2960,  9134, 16242, 26008], [ 3092,  9541, 16967, 27168],
    [ 3230,  9966, 17723, 28379], [ 3374, 10410, 18513, 29644],
    [ 3524, 10874, 19338, 30966], [ 3681, 11359, 20200, 32767],
    [ 3845, 11865, 21101, 32767], [ 4017, 12394, 22042, 32767],
    [ 4196, 12947, 23024, 32767], [ 4383, 13524, 24050, 32767],
    [ 4579, 14127, 25122, 32767], [ 4783, 14757, 26242, 32767],
    [ 4996, 15414, 27412, 32767], [ 5219, 16101, 28634, 32767],
    [ 5451, 16819, 29910, 32767], [ 5694, 17569, 31243, 32767],
    [ 5948, 18352, 32636, 32767], [ 6213, 19170, 32767, 32767],
    [ 6490, 20024, 32767, 32767], [ 6779, 20917, 32767, 32767],
    [ 7082, 21849, 32767, 32767], [ 7397, 22823, 32767, 32767],
    [ 7727, 23840, 32767, 32767], [ 8071, 24903, 32767, 32767],
    [ 8431, 26013, 32767, 32767], [ 8807, 27172, 32767, 32767],
    [ 9200, 28383, 32767, 32767], [ 9610, 29648, 32767, 32767],
];

/// Step magnitudes for 2-bit codewords, one row per quantized index.
pub(crate) const STEP_2BIT: [[i16; 2]; 128] = [
    [   64,   216], [   67,   226], [   70,   236], [   74,   246],
    [   77,   257], [   80,   268], [   84,   280], [   88,   294],
    [   92,   307], [   96,   321], [  100,   334], [  104,   350],
    [  109,   365], [  114,   382], [  119,   399], [  124,   416],
    [  130,   434], [  136,   454], [  142,   475], [  148,   495],
    [  155,   519], [  162,   541], [  169,   564], [  176,   590],
    [  185,   617], [  193,   644], [  201,   673], [  210,   703],
    [  220,   735], [  230,   767], [  240,   801], [  251,   838],
    [  262,   876], [  274,   914], [  286,   955], [  299,   997],
    [  312,  1041], [  326,  1089], [  341,  1138], [  356,  1188],
    [  372,  1241], [  388,  1297], [  406,  1354], [  424,  1415],
    [  443,  1478], [  462,  1544], [  483,  1613], [  505,  1684],
    [  527,  1760], [  551,  1838], [  576,  1921], [  601,  2007],
    [  628,  2097], [  656,  2190], [  686,  2288], [  716,  2390],
    [  748,  2497], [  781,  2608], [  816,  2724], [  853,  2846],
    [  891,  2973], [  930,  3104], [  972,  3243], [ 1015,  3387],
    [ 1060,  3538], [ 1108,  3696], [ 1157,  3861], [ 1209,  4033],
    [ 1263,  4213], [ 1319,  4401], [ 1378,  4598], [ 1439,  4803],
    [ 1503,  5017], [ 1570,  5241], [ 1640,  5475], [ 1713,  5719],
    [ 1790,  5974], [ 1870,  6240], [ 1953,  6519], [ 2040,  6809],
    [ 2131,  7113], [ 2226,  7430], [ 2325,  7762], [ 2429,  8108],
    [ 2537,  8469], [ 2650,  8847], [ 2768,  9241], [ 2892,  9653],
    [ 3021, 10083], [ 3155, 10532], [ 3296, 11002], [ 3443, 11492],
    [ 3597, 12004], [ 3757, 12539], [ 3925, 13098], [ 4100, 13681],
    [ 4283, 14291], [ 4474, 14928], [ 4673, 15593], [ 4882, 16288],
    [ 5099, 17014], [ 5327, 17772], [ 5564, 18564], [ 5812, 19391],
    [ 6071, 20256], [ 6342, 21158], [ 6625, 22101], [ 6920, 23086],
    [ 7229, 24114], [ 7551, 25189], [ 7888, 26312], [ 8239, 27485],
    [ 8607, 28709], [ 8991, 29989], [ 9391, 31325], [ 9810, 32720],
    [10247, 32767], [10704, 32767], [11181, 32767], [11679, 32767],
    [12200, 32767], [12744, 32767], [13312, 32767], [13905, 32767],
    [14525, 32767], [15172, 32767], [15848, 32767], [16555, 32767],
];
